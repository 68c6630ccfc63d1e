use visualizer_logging::viz_debug;

use super::{
    apply_common_step, CommonStep, DoorType, ScopeSelection, StepInput, WizardError, WizardFlow,
    WizardSelection,
};

/// Questions asked inside the scope step, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeSubStep {
    Patio,
    Windows,
    Doors,
    DoorType,
}

impl ScopeSubStep {
    fn name(self) -> &'static str {
        match self {
            ScopeSubStep::Patio => "patio",
            ScopeSubStep::Windows => "windows",
            ScopeSubStep::Doors => "doors",
            ScopeSubStep::DoorType => "door type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeAnswer {
    Yes,
    No,
    DoorType(DoorType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubStepOutcome {
    Next(ScopeSubStep),
    /// Leave the scope questions for the next top-level step.
    Exit,
}

/// Sub-step transition as a pure function of the question being answered
/// and the answer being recorded in this same transition.
pub fn next_sub_step(
    current: ScopeSubStep,
    answer: ScopeAnswer,
) -> Result<SubStepOutcome, WizardError> {
    use ScopeAnswer::{No, Yes};
    match (current, answer) {
        (ScopeSubStep::Patio, Yes | No) => Ok(SubStepOutcome::Next(ScopeSubStep::Windows)),
        (ScopeSubStep::Windows, Yes | No) => Ok(SubStepOutcome::Next(ScopeSubStep::Doors)),
        (ScopeSubStep::Doors, Yes) => Ok(SubStepOutcome::Next(ScopeSubStep::DoorType)),
        (ScopeSubStep::Doors, No) => Ok(SubStepOutcome::Exit),
        (ScopeSubStep::DoorType, ScopeAnswer::DoorType(_)) => Ok(SubStepOutcome::Exit),
        (step, _) => Err(WizardError::UnexpectedInput {
            step: step.name(),
            input: "scope answer",
        }),
    }
}

fn record_answer(scope: &mut ScopeSelection, current: ScopeSubStep, answer: ScopeAnswer) {
    let yes = answer == ScopeAnswer::Yes;
    match (current, answer) {
        (ScopeSubStep::Patio, _) => scope.set_patio(yes),
        (ScopeSubStep::Windows, _) => scope.set_windows(yes),
        (ScopeSubStep::Doors, _) => scope.set_doors(yes),
        (ScopeSubStep::DoorType, ScopeAnswer::DoorType(door_type)) => {
            scope.set_door_type(door_type)
        }
        (ScopeSubStep::DoorType, _) => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopedStep {
    Scope(ScopeSubStep),
    Mesh,
    Customization,
    Image,
    Review,
}

impl ScopedStep {
    /// One-based top-level step number; all scope questions share step 1.
    pub fn number(self) -> u8 {
        match self {
            ScopedStep::Scope(_) => 1,
            ScopedStep::Mesh => 2,
            ScopedStep::Customization => 3,
            ScopedStep::Image => 4,
            ScopedStep::Review => 5,
        }
    }
}

/// Intake whose first step is the branching scope questionnaire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedWizard {
    step: ScopedStep,
    selection: WizardSelection,
    submitted: bool,
}

impl Default for ScopedWizard {
    fn default() -> Self {
        Self {
            step: ScopedStep::Scope(ScopeSubStep::Patio),
            selection: WizardSelection::default(),
            submitted: false,
        }
    }
}

impl ScopedWizard {
    pub fn new() -> Self {
        Self::default()
    }

    fn advance_scope(
        &mut self,
        current: ScopeSubStep,
        answer: ScopeAnswer,
    ) -> Result<ScopedStep, WizardError> {
        let outcome = next_sub_step(current, answer)?;
        record_answer(self.selection.scope_mut(), current, answer);
        self.selection.sync_categories_from_scope();
        self.step = match outcome {
            SubStepOutcome::Next(sub_step) => ScopedStep::Scope(sub_step),
            SubStepOutcome::Exit => ScopedStep::Mesh,
        };
        viz_debug!("scope {:?} answered {:?} -> {:?}", current, answer, self.step);
        Ok(self.step)
    }

    /// Last question actually reached on the way out of the scope step.
    fn last_scope_question(&self) -> ScopeSubStep {
        match self.selection.scope() {
            Some(scope) if scope.has_doors() => ScopeSubStep::DoorType,
            _ => ScopeSubStep::Doors,
        }
    }
}

impl WizardFlow for ScopedWizard {
    type Step = ScopedStep;

    fn current_step(&self) -> ScopedStep {
        self.step
    }

    fn next(&mut self, input: StepInput) -> Result<ScopedStep, WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        let common = match (self.step, input) {
            (ScopedStep::Scope(current), StepInput::Scope(answer)) => {
                return self.advance_scope(current, answer);
            }
            (ScopedStep::Review, StepInput::Continue) => {
                self.submitted = true;
                viz_debug!("scoped wizard confirmed");
                return Ok(self.step);
            }
            (ScopedStep::Mesh, input) => (CommonStep::Mesh, input),
            (ScopedStep::Customization, input) => (CommonStep::Customization, input),
            (ScopedStep::Image, input) => (CommonStep::Image, input),
            (ScopedStep::Scope(current), input) => {
                return Err(WizardError::UnexpectedInput {
                    step: current.name(),
                    input: input.name(),
                });
            }
            (ScopedStep::Review, input) => {
                return Err(WizardError::UnexpectedInput {
                    step: "review",
                    input: input.name(),
                });
            }
        };
        let (step, input) = common;
        apply_common_step(&mut self.selection, step, input)?;
        self.step = match step {
            CommonStep::Mesh => ScopedStep::Customization,
            CommonStep::Customization => ScopedStep::Image,
            CommonStep::Image => ScopedStep::Review,
        };
        Ok(self.step)
    }

    fn back(&mut self) -> ScopedStep {
        if self.submitted {
            return self.step;
        }
        self.step = match self.step {
            ScopedStep::Scope(ScopeSubStep::Patio) => ScopedStep::Scope(ScopeSubStep::Patio),
            ScopedStep::Scope(ScopeSubStep::Windows) => ScopedStep::Scope(ScopeSubStep::Patio),
            ScopedStep::Scope(ScopeSubStep::Doors) => ScopedStep::Scope(ScopeSubStep::Windows),
            ScopedStep::Scope(ScopeSubStep::DoorType) => ScopedStep::Scope(ScopeSubStep::Doors),
            ScopedStep::Mesh => ScopedStep::Scope(self.last_scope_question()),
            ScopedStep::Customization => ScopedStep::Mesh,
            ScopedStep::Image => ScopedStep::Customization,
            ScopedStep::Review => ScopedStep::Image,
        };
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
