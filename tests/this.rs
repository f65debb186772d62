#[macro_use]
mod common;

#[cfg(test)]
mod this {
    tests! {
        in_method in this is OK
        "Egotist instance"
    }

    tests! {
        closure in this is OK
        "Foo"
    }

    tests! {
        top_level in this is ERR
        "[line 1:7] Error at 'this': Cannot use 'this' outside of a class"
    }

    tests! {
        in_function in this is ERR
        "[line 2:9] Error at 'this': Cannot use 'this' outside of a class"
    }
}
