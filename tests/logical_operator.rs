#[macro_use]
mod common;

#[cfg(test)]
mod logical_operator {
    tests! {
        and in logical_operator is OK
        "false"
        "1"
        "false"
        "true"
    }

    tests! {
        or in logical_operator is OK
        "1"
        "1"
        "true"
        "false"
    }

    tests! {
        short_circuit in logical_operator is OK
        "true"
        "false"
    }
}
