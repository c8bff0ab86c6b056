//! Conversion context
//!
//! A [`Marshaller`] borrows one attached thread's [`RuntimeEnv`] together
//! with the options that shape a conversion pass. The converters, discovery
//! and `send` are implemented on it in their own modules.

use jnyikes_sdk::{JyError, JyResult, LocalRef, ObjectRef, RuntimeEnv};

use crate::options::EngineOptions;

/// Runtime env plus conversion options
#[derive(Clone, Copy)]
pub struct Marshaller<'env> {
    env: &'env dyn RuntimeEnv,
    describe_exceptions: bool,
    max_depth: usize,
}

impl<'env> Marshaller<'env> {
    /// Marshaller with default options
    pub fn new(env: &'env dyn RuntimeEnv) -> Self {
        Self::with_options(env, &EngineOptions::default())
    }

    /// Marshaller with explicit options
    pub fn with_options(env: &'env dyn RuntimeEnv, options: &EngineOptions) -> Self {
        Self {
            env,
            describe_exceptions: options.describe_exceptions,
            max_depth: options.max_depth,
        }
    }

    /// The borrowed env
    pub fn env(&self) -> &'env dyn RuntimeEnv {
        self.env
    }

    /// Object-to-bag nesting limit
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Clear a pending runtime exception; returns whether one was pending
    pub fn clear_exception(&self) -> bool {
        if !self.env.exception_check() {
            return false;
        }
        if self.describe_exceptions {
            self.env.exception_describe();
        }
        self.env.exception_clear();
        log::warn!("cleared pending runtime exception");
        true
    }

    /// `ExceptionRaised` if the last runtime call threw
    pub(crate) fn check_exception(&self) -> JyResult<()> {
        if self.clear_exception() {
            Err(JyError::ExceptionRaised)
        } else {
            Ok(())
        }
    }

    /// Own a reference returned by a lookup.
    ///
    /// A null result clears whatever exception the lookup left behind and
    /// fails with `err`.
    pub(crate) fn own(&self, obj: Option<ObjectRef>, err: JyError) -> JyResult<LocalRef<'env>> {
        match obj {
            Some(obj) => Ok(LocalRef::new(self.env, obj)),
            None => {
                self.clear_exception();
                Err(err)
            }
        }
    }

    /// Own a reference returned by a call, which may legitimately be null.
    pub(crate) fn own_result(&self, obj: Option<ObjectRef>) -> JyResult<Option<LocalRef<'env>>> {
        let obj = LocalRef::wrap(self.env, obj);
        self.check_exception()?;
        Ok(obj)
    }
}

impl std::fmt::Debug for Marshaller<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marshaller")
            .field("describe_exceptions", &self.describe_exceptions)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
