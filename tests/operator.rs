#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    tests! {
        arithmetic in operator is OK
        "8"
        "2"
        "15"
        "2.5"
        "-2"
        "9"
    }

    tests! {
        comparison in operator is OK
        "true"
        "true"
        "false"
        "true"
    }

    tests! {
        add_mixed in operator is ERR
        "Operands must be two numbers or two strings"
        "[line 1]"
    }

    tests! {
        negate_string in operator is ERR
        "Operand must be a number"
        "[line 1]"
    }

    tests! {
        compare_mixed in operator is ERR
        "Operands must be numbers"
        "[line 1]"
    }

    tests! {
        subtract_string in operator is ERR
        "Operands must be numbers"
        "[line 1]"
    }
}
