use visualizer_logging::viz_debug;

use super::{apply_common_step, CommonStep, StepInput, WizardError, WizardFlow, WizardSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FlatStep {
    Categories = 1,
    Mesh = 2,
    Customization = 3,
    Image = 4,
    Review = 5,
}

impl FlatStep {
    pub fn number(self) -> u8 {
        self as u8
    }

    fn following(self) -> Option<FlatStep> {
        match self {
            FlatStep::Categories => Some(FlatStep::Mesh),
            FlatStep::Mesh => Some(FlatStep::Customization),
            FlatStep::Customization => Some(FlatStep::Image),
            FlatStep::Image => Some(FlatStep::Review),
            FlatStep::Review => None,
        }
    }

    fn preceding(self) -> Option<FlatStep> {
        match self {
            FlatStep::Categories => None,
            FlatStep::Mesh => Some(FlatStep::Categories),
            FlatStep::Customization => Some(FlatStep::Mesh),
            FlatStep::Image => Some(FlatStep::Customization),
            FlatStep::Review => Some(FlatStep::Image),
        }
    }
}

/// Linear five-step intake: categories, mesh, customization, image, review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatWizard {
    step: FlatStep,
    selection: WizardSelection,
    submitted: bool,
}

impl Default for FlatWizard {
    fn default() -> Self {
        Self {
            step: FlatStep::Categories,
            selection: WizardSelection::default(),
            submitted: false,
        }
    }
}

impl FlatWizard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WizardFlow for FlatWizard {
    type Step = FlatStep;

    fn current_step(&self) -> FlatStep {
        self.step
    }

    fn next(&mut self, input: StepInput) -> Result<FlatStep, WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        match (self.step, input) {
            (FlatStep::Categories, StepInput::Categories(categories)) => {
                if categories.is_empty() {
                    return Err(WizardError::CategoriesRequired);
                }
                self.selection.set_categories(categories);
            }
            (FlatStep::Categories, StepInput::Continue) => {
                if self.selection.categories().is_empty() {
                    return Err(WizardError::CategoriesRequired);
                }
            }
            (FlatStep::Mesh, input) => {
                apply_common_step(&mut self.selection, CommonStep::Mesh, input)?
            }
            (FlatStep::Customization, input) => {
                apply_common_step(&mut self.selection, CommonStep::Customization, input)?
            }
            (FlatStep::Image, input) => {
                apply_common_step(&mut self.selection, CommonStep::Image, input)?
            }
            (FlatStep::Review, StepInput::Continue) => {
                self.submitted = true;
                viz_debug!("flat wizard confirmed");
                return Ok(self.step);
            }
            (step, input) => {
                return Err(WizardError::UnexpectedInput {
                    step: flat_step_name(step),
                    input: input.name(),
                });
            }
        }
        if let Some(next) = self.step.following() {
            viz_debug!("flat wizard {:?} -> {:?}", self.step, next);
            self.step = next;
        }
        Ok(self.step)
    }

    fn back(&mut self) -> FlatStep {
        if !self.submitted {
            if let Some(previous) = self.step.preceding() {
                self.step = previous;
            }
        }
        self.step
    }

    fn is_complete(&self) -> bool {
        self.submitted
    }

    fn selection(&self) -> &WizardSelection {
        &self.selection
    }

    fn progress_fraction(&self) -> f64 {
        f64::from(self.step.number() - 1) / 4.0
    }
}

fn flat_step_name(step: FlatStep) -> &'static str {
    match step {
        FlatStep::Categories => "categories",
        FlatStep::Mesh => "mesh",
        FlatStep::Customization => "customization",
        FlatStep::Image => "image",
        FlatStep::Review => "review",
    }
}
