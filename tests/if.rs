#[macro_use]
mod common;

#[cfg(test)]
mod if_stmt {
    tests! {
        truthiness in if is OK
        "true is truthy"
        "nil is falsey"
        "zero is truthy"
        "empty string is truthy"
    }

    tests! {
        else_branch in if is OK
        "else"
        "then"
    }

    tests! {
        dangling_else in if is OK
        "good"
    }
}
