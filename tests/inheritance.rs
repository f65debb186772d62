#[macro_use]
mod common;

#[cfg(test)]
mod inheritance {
    tests! {
        inherit_method in inheritance is OK
        "Base.foo()"
    }

    tests! {
        override_method in inheritance is OK
        "Derived"
    }

    tests! {
        superclass_must_be_class in inheritance is ERR
        "Superclass must be a class"
        "[line 2]"
    }

    tests! {
        self_inherit in inheritance is ERR
        "[line 1:13] Error at 'Foo': A class cannot inherit from itself"
    }
}
