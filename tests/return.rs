#[macro_use]
mod common;

#[cfg(test)]
mod return_stmt {
    tests! {
        value in return is OK
        "value"
    }

    tests! {
        bare in return is OK
        "nil"
    }

    tests! {
        in_loop in return is OK
        "3"
    }

    tests! {
        top_level in return is ERR
        "[line 1:1] Error at 'return': Cannot return from top-level code"
    }
}
