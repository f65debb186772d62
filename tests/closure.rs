#[macro_use]
mod common;

#[cfg(test)]
mod closure {
    tests! {
        counter in closure is OK
        "1"
        "2"
    }

    tests! {
        shared in closure is OK
        "initial"
        "updated"
    }

    tests! {
        close_over_parameter in closure is OK
        "param"
    }

    tests! {
        nested in closure is OK
        "a"
        "b"
    }
}
