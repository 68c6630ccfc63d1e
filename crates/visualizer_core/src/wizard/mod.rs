//! Order intake wizards.
//!
//! Two shapes share the [`WizardFlow`] contract: a linear categorical flow
//! ([`FlatWizard`]) and a flow whose first step is a branching set of scope
//! questions ([`ScopedWizard`]). Both own their [`WizardSelection`]
//! exclusively and only mutate it inside `next`.
mod flat;
mod payload;
mod scope;
mod selection;

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

pub use flat::{FlatStep, FlatWizard};
pub use payload::{SubmissionPayload, LEGACY_SCREEN_TYPE};
pub use scope::{next_sub_step, ScopeAnswer, ScopeSubStep, ScopedStep, ScopedWizard, SubStepOutcome};
pub use selection::{
    Category, DoorType, FrameColor, ImageRef, MeshChoice, MeshColor, ScopeSelection,
    WizardSelection,
};

/// Value supplied with a `next` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    Categories(BTreeSet<Category>),
    Mesh(MeshChoice),
    Colors { frame: FrameColor, mesh: MeshColor },
    Image(ImageRef),
    Scope(ScopeAnswer),
    /// Accept the current step with what is already selected.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("select at least one screen category")]
    CategoriesRequired,
    #[error("an image is required before review")]
    ImageRequired,
    #[error("input {input} does not apply to step {step}")]
    UnexpectedInput {
        step: &'static str,
        input: &'static str,
    },
    #[error("the order was already submitted")]
    AlreadySubmitted,
    #[error("the order is not complete yet")]
    Incomplete,
    #[error("unknown {field} option: {value}")]
    UnknownOption { field: &'static str, value: String },
}

impl StepInput {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            StepInput::Categories(_) => "categories",
            StepInput::Mesh(_) => "mesh",
            StepInput::Colors { .. } => "colors",
            StepInput::Image(_) => "image",
            StepInput::Scope(_) => "scope answer",
            StepInput::Continue => "continue",
        }
    }
}

/// Contract shared by the intake wizards.
pub trait WizardFlow {
    type Step: Copy + Eq + fmt::Debug;

    fn current_step(&self) -> Self::Step;

    /// Records `input` for the current step and advances when valid.
    /// On error the step and selection are unchanged.
    fn next(&mut self, input: StepInput) -> Result<Self::Step, WizardError>;

    /// Moves one step (or sub-step) back; no-op at the start or after
    /// submission.
    fn back(&mut self) -> Self::Step;

    fn is_complete(&self) -> bool;

    fn selection(&self) -> &WizardSelection;

    /// Fraction of the top-level steps already behind the user, `0.0..=1.0`.
    fn progress_fraction(&self) -> f64;

    fn build_payload(&self) -> Result<SubmissionPayload, WizardError> {
        if !self.is_complete() {
            return Err(WizardError::Incomplete);
        }
        SubmissionPayload::from_selection(self.selection())
    }
}

/// Steps both wizards share after their opening step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommonStep {
    Mesh,
    Customization,
    Image,
}

impl CommonStep {
    fn name(self) -> &'static str {
        match self {
            CommonStep::Mesh => "mesh",
            CommonStep::Customization => "customization",
            CommonStep::Image => "image",
        }
    }
}

pub(crate) fn apply_common_step(
    selection: &mut WizardSelection,
    step: CommonStep,
    input: StepInput,
) -> Result<(), WizardError> {
    match (step, input) {
        (CommonStep::Mesh, StepInput::Mesh(choice)) => selection.set_mesh_choice(choice),
        (CommonStep::Customization, StepInput::Colors { frame, mesh }) => {
            selection.set_colors(frame, mesh)
        }
        (CommonStep::Image, StepInput::Image(image)) => selection.set_image(image),
        (CommonStep::Image, StepInput::Continue) if selection.image().is_none() => {
            return Err(WizardError::ImageRequired);
        }
        (_, StepInput::Continue) => {}
        (step, input) => {
            return Err(WizardError::UnexpectedInput {
                step: step.name(),
                input: input.name(),
            });
        }
    }
    Ok(())
}
