#[macro_use]
mod common;

#[cfg(test)]
mod string {
    tests! {
        literals in string is OK
        "hello"
        ""
        "\\n"
    }

    tests! {
        multiline in string is OK
        "one"
        "two"
    }

    tests! {
        concat in string is OK
        "abcd"
    }

    tests! {
        unterminated in string is ERR
        "[line 1:9] Error: Unterminated string"
    }
}
