#[macro_use]
mod common;

#[cfg(test)]
mod number {
    tests! {
        literals in number is OK
        "123"
        "987654"
        "0"
        "-0"
        "123.456"
        "-0.001"
    }

    tests! {
        integral_stringify in number is OK
        "1"
        "1.5"
    }

    tests! {
        nan_equality in number is OK
        "false"
        "true"
        "false"
        "true"
    }

    tests! {
        division_by_zero in number is OK
        "inf"
        "-inf"
        "NaN"
    }

    tests! {
        trailing_dot in number is ERR
        "[line 1:11] Error at ';': Expect property name after '.'"
    }

    tests! {
        leading_dot in number is ERR
        "[line 1:1] Error at '.': Expect expression"
    }
}
