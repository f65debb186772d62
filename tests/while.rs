#[macro_use]
mod common;

#[cfg(test)]
mod while_stmt {
    tests! {
        iterate in while is OK
        "0"
        "1"
        "2"
    }

    tests! {
        condition_falsey in while is OK
        "done"
    }
}
