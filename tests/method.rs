#[macro_use]
mod common;

#[cfg(test)]
mod method {
    tests! {
        call in method is OK
        "Hello world"
    }

    tests! {
        bound in method is OK
        "Jane"
    }

    tests! {
        to_string in method is OK
        "<fn sayName>"
    }
}
