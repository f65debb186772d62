#[macro_use]
mod common;

#[cfg(test)]
mod for_stmt {
    tests! {
        iterate in for is OK
        "0"
        "1"
        "2"
    }

    tests! {
        statement_initializer in for is OK
        "0"
        "1"
        "2"
    }

    tests! {
        closure_in_body in for is OK
        "1"
    }
}
