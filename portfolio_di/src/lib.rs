//! Minimal compile time dependency injection.
//!
//! A [`Provider`] owns the leaf dependencies (configuration, connections) and
//! every other type is assembled recursively through [`Build`], usually by
//! deriving it. Built values are cached per provider, so a type requested
//! from several places resolves to the same (cloned) instance and shares its
//! `#[state]`.

extern crate self as portfolio_di;

pub use portfolio_di_derive::Build;
pub use typemap::TypeMap;

mod macros;
mod typemap;

pub trait Provider: Sized {
    /// Returns the cache of values that have already been built.
    fn cache(&mut self) -> &mut TypeMap;
}

#[diagnostic::on_unimplemented(
    message = "The type `{Self}` cannot be built using the provider `{P}`",
    note = "Add `{Self}` to the provider `{P}` or implement `Build` for `{Self}` and make sure \
            all dependencies are satisfied"
)]
pub trait Build<P: Provider>: Clone + 'static {
    fn build(provider: &mut P) -> Self;
}

pub trait Provide: Provider {
    fn provide<T: Build<Self>>(&mut self) -> T {
        T::build(self)
    }
}

impl<P: Provider> Provide for P {}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[derive(Debug, Clone)]
    struct Greeting(&'static str);

    #[derive(Debug, Clone, Default)]
    struct Counter(Arc<AtomicUsize>);

    #[derive(Debug, Clone, Build)]
    struct Greeter {
        greeting: Greeting,
        #[state]
        counter: Counter,
    }

    #[derive(Debug, Clone, Build)]
    struct App {
        first: Greeter,
        second: Greeter,
    }

    provider! {
        TestProvider { greeting: Greeting, }
    }

    #[test]
    fn provide_shares_built_instances() {
        let mut provider = TestProvider {
            _cache: Default::default(),
            greeting: Greeting("hello"),
        };

        let app: App = provider.provide();
        app.first.counter.0.fetch_add(1, Ordering::Relaxed);

        assert_eq!(app.second.greeting.0, "hello");
        assert_eq!(app.second.counter.0.load(Ordering::Relaxed), 1);
    }
}
