//! Transform pipeline infrastructure
//!
//! The transpiler is a chain of text stages. Each stage implements
//! [`Runnable`], and [`Transform`] strings stages together:
//!
//! ```rust,ignore
//! let forward = Transform::identity()
//!     .then(ApplyPatterns::new(patterns))      // slide into os → import os
//!     .then(SubstituteKeywords::new(keywords)) // rizz → return
//!     .then(FixSyntax)
//!     .then(NormalizeIndentation);
//!
//! let python = forward.run(source);
//! ```
//!
//! Every stage is total: any input text produces some output text, so unlike a
//! parser pipeline there is no error channel. The compiler still checks that
//! each stage's input type matches the previous stage's output type.
//!
//! See [`stages`] for the stages the transpiler is built from.

pub mod stages;

/// Anything that can transform an input to an output
pub trait Runnable<I, O> {
    fn run(&self, input: I) -> O;
}

/// A composable transformation from `I` to `O`
pub struct Transform<I, O> {
    run_fn: Box<dyn Fn(I) -> O + Send + Sync>,
}

impl<I: 'static> Transform<I, I> {
    /// A transform that passes input through unchanged; the usual starting point
    pub fn identity() -> Self {
        Transform {
            run_fn: Box::new(|input| input),
        }
    }
}

impl<I, O> Transform<I, O> {
    /// Create a transform from a function
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        Transform {
            run_fn: Box::new(f),
        }
    }

    /// Chain `stage` after this transform
    pub fn then<O2, S>(self, stage: S) -> Transform<I, O2>
    where
        S: Runnable<O, O2> + Send + Sync + 'static,
        I: 'static,
        O: 'static,
        O2: 'static,
    {
        let prev_run = self.run_fn;
        Transform {
            run_fn: Box::new(move |input| stage.run(prev_run(input))),
        }
    }

    /// Chain `stage` only when `enabled`; otherwise this transform is returned as is
    pub fn then_if<S>(self, enabled: bool, stage: S) -> Transform<I, O>
    where
        S: Runnable<O, O> + Send + Sync + 'static,
        I: 'static,
        O: 'static,
    {
        if enabled {
            self.then(stage)
        } else {
            self
        }
    }

    /// Execute this transform on the given input
    pub fn run(&self, input: I) -> O {
        (self.run_fn)(input)
    }
}

// Transforms can be used as stages of other transforms
impl<I, O> Runnable<I, O> for Transform<I, O>
where
    I: 'static,
    O: 'static,
{
    fn run(&self, input: I) -> O {
        Transform::run(self, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;
    impl Runnable<String, String> for Upper {
        fn run(&self, input: String) -> String {
            input.to_uppercase()
        }
    }

    struct Suffix(&'static str);
    impl Runnable<String, String> for Suffix {
        fn run(&self, input: String) -> String {
            format!("{}{}", input, self.0)
        }
    }

    struct Length;
    impl Runnable<String, usize> for Length {
        fn run(&self, input: String) -> usize {
            input.len()
        }
    }

    #[test]
    fn test_identity() {
        let transform = Transform::<String, String>::identity();
        assert_eq!(transform.run("x".to_string()), "x");
    }

    #[test]
    fn test_stages_run_in_order() {
        let transform = Transform::identity().then(Suffix("!")).then(Upper);
        assert_eq!(transform.run("bet".to_string()), "BET!");

        let transform = Transform::identity().then(Upper).then(Suffix("!"));
        assert_eq!(transform.run("bet".to_string()), "BET!");
    }

    #[test]
    fn test_type_changing_stage() {
        let transform = Transform::identity().then(Suffix("??")).then(Length);
        assert_eq!(transform.run("abc".to_string()), 5);
    }

    #[test]
    fn test_then_if() {
        let on = Transform::identity().then_if(true, Suffix("!"));
        let off = Transform::identity().then_if(false, Suffix("!"));
        assert_eq!(on.run("a".to_string()), "a!");
        assert_eq!(off.run("a".to_string()), "a");
    }

    #[test]
    fn test_transform_as_stage() {
        let inner = Transform::identity().then(Upper);
        let outer = Transform::from_fn(|s: String| s.trim().to_string()).then(inner);
        assert_eq!(outer.run("  no cap ".to_string()), "NO CAP");
    }
}
