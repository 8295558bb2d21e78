//! Sequential module pipeline.
//!
//! A [`Pipeline`] applies an ordered list of [`Module`]s to a [`Document`].
//! Modules run strictly one after another; each gets exclusive mutable
//! access to the whole document for its turn, so module `i + 1` observes
//! every change made by module `i`.
//!
//! # Example
//!
//! ```
//! use doctables::extract::StaticExtractor;
//! use doctables::pipeline::{FailurePolicy, Pipeline};
//! use doctables::tables::TableDetectionModule;
//! use doctables::Document;
//!
//! let pipeline = Pipeline::new()
//!     .with_default_policy(FailurePolicy::SkipAndContinue)
//!     .add(TableDetectionModule::new(StaticExtractor::empty()));
//!
//! let output = pipeline.run(Document::new()).unwrap();
//! assert!(output.diagnostics.is_empty());
//! ```

mod cancel;
mod diagnostics;

pub use cancel::CancellationToken;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};

use crate::error::{PipelineError, Result};
use crate::model::Document;

/// A unit of pipeline processing that mutates a document.
pub trait Module: Send + Sync {
    /// Get the name of this module.
    fn name(&self) -> &str;

    /// Process the document.
    ///
    /// Recoverable problems go to [`ModuleContext::record`]; an `Err` means
    /// the module failed as a whole and is handled by the pipeline's
    /// [`FailurePolicy`].
    fn run(&self, document: &mut Document, ctx: &mut ModuleContext<'_>) -> Result<()>;
}

/// What a module may touch besides the document.
pub struct ModuleContext<'a> {
    diagnostics: &'a mut Diagnostics,
    cancel: &'a CancellationToken,
}

impl<'a> ModuleContext<'a> {
    /// Create a context over a diagnostics sink and a cancellation token.
    pub fn new(diagnostics: &'a mut Diagnostics, cancel: &'a CancellationToken) -> Self {
        Self {
            diagnostics,
            cancel,
        }
    }

    /// Record a non-fatal problem.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Cancellation token of the run.
    pub fn cancel_token(&self) -> &CancellationToken {
        self.cancel
    }

    /// Check whether the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// What happens when a module returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the run and surface the error.
    #[default]
    Fatal,
    /// Record the error, keep the document as the module left it, continue.
    SkipAndContinue,
    /// Record the error, restore the document to its state before the
    /// module ran, continue.
    Rollback,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The mutated document
    pub document: Document,
    /// Everything recorded along the way (possibly empty)
    pub diagnostics: Diagnostics,
}

struct Stage {
    module: Box<dyn Module>,
    policy: Option<FailurePolicy>,
}

/// Ordered list of modules plus the rules for running them.
pub struct Pipeline {
    stages: Vec<Stage>,
    default_policy: FailurePolicy,
    cancel: CancellationToken,
}

impl Pipeline {
    /// Create an empty pipeline with the [`FailurePolicy::Fatal`] default.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            default_policy: FailurePolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Append a module using the pipeline's default policy.
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, module: impl Module + 'static) -> Self {
        self.stages.push(Stage {
            module: Box::new(module),
            policy: None,
        });
        self
    }

    /// Append a module with its own failure policy.
    pub fn add_with_policy(mut self, module: impl Module + 'static, policy: FailurePolicy) -> Self {
        self.stages.push(Stage {
            module: Box::new(module),
            policy: Some(policy),
        });
        self
    }

    /// Set the policy used by modules without their own.
    pub fn with_default_policy(mut self, policy: FailurePolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels this pipeline's runs.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Names of the modules, in execution order.
    pub fn module_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.module.name()).collect()
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the pipeline has no modules.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every module over an owned document.
    pub fn run(&self, mut document: Document) -> std::result::Result<PipelineOutput, PipelineError> {
        let diagnostics = self.run_in_place(&mut document)?;
        Ok(PipelineOutput {
            document,
            diagnostics,
        })
    }

    /// Run every module over a borrowed document.
    ///
    /// On error the document keeps every change committed so far (minus a
    /// rolled-back module's changes).
    pub fn run_in_place(
        &self,
        document: &mut Document,
    ) -> std::result::Result<Diagnostics, PipelineError> {
        let mut diagnostics = Diagnostics::new();

        for (position, stage) in self.stages.iter().enumerate() {
            if self.cancel.is_cancelled() {
                log::info!("pipeline cancelled before module {}", position);
                return Err(PipelineError::Cancelled {
                    completed_modules: position,
                    diagnostics,
                });
            }

            let name = stage.module.name();
            let policy = stage.policy.unwrap_or(self.default_policy);
            let snapshot = (policy == FailurePolicy::Rollback).then(|| document.clone());

            log::debug!("running module '{}' ({:?})", name, policy);
            let result = {
                let mut ctx = ModuleContext::new(&mut diagnostics, &self.cancel);
                stage.module.run(document, &mut ctx)
            };

            if let Err(err) = result {
                match policy {
                    FailurePolicy::Fatal => {
                        log::error!("module '{}' failed: {}", name, err);
                        return Err(PipelineError::ModuleFailed {
                            module: name.to_string(),
                            source: err,
                        });
                    }
                    FailurePolicy::SkipAndContinue => {
                        log::warn!("module '{}' failed, continuing: {}", name, err);
                        diagnostics.push(Diagnostic::module_failure(name, &err));
                    }
                    FailurePolicy::Rollback => {
                        log::warn!("module '{}' failed, rolling back: {}", name, err);
                        if let Some(snapshot) = snapshot {
                            *document = snapshot;
                        }
                        diagnostics.push(Diagnostic::module_failure(name, &err));
                    }
                }
            }

            if self.cancel.is_cancelled() {
                log::info!("pipeline cancelled during module '{}'", name);
                return Err(PipelineError::Cancelled {
                    completed_modules: position + 1,
                    diagnostics,
                });
            }
        }

        Ok(diagnostics)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
