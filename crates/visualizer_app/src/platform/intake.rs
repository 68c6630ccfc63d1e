//! Drives the order wizards from command-line answers.
use std::fs;
use std::path::Path;

use anyhow::Context;
use visualizer_core::wizard::{
    Category, DoorType, FlatWizard, ImageRef, ScopeAnswer, ScopedWizard, StepInput,
    SubmissionPayload, WizardError, WizardFlow,
};

use super::cli::ScreenOptions;

/// Answers to the branching scope questions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeAnswers {
    pub patio: bool,
    pub windows: bool,
    pub doors: bool,
    pub door_type: Option<DoorType>,
}

pub fn flat_payload(
    categories: &[Category],
    options: &ScreenOptions,
    image: ImageRef,
) -> Result<SubmissionPayload, WizardError> {
    let mut wizard = FlatWizard::new();
    wizard.next(StepInput::Categories(categories.iter().copied().collect()))?;
    finish(&mut wizard, options, image)?;
    wizard.build_payload()
}

pub fn scoped_payload(
    answers: ScopeAnswers,
    options: &ScreenOptions,
    image: ImageRef,
) -> Result<SubmissionPayload, WizardError> {
    let mut wizard = ScopedWizard::new();
    for answer in [answers.patio, answers.windows, answers.doors] {
        wizard.next(StepInput::Scope(yes_no(answer)))?;
    }
    if answers.doors {
        let door_type = answers.door_type.unwrap_or_default();
        wizard.next(StepInput::Scope(ScopeAnswer::DoorType(door_type)))?;
    }
    finish(&mut wizard, options, image)?;
    wizard.build_payload()
}

fn yes_no(answer: bool) -> ScopeAnswer {
    if answer {
        ScopeAnswer::Yes
    } else {
        ScopeAnswer::No
    }
}

/// Mesh, colors, image and confirmation, shared by both flows.
fn finish<W: WizardFlow>(
    wizard: &mut W,
    options: &ScreenOptions,
    image: ImageRef,
) -> Result<(), WizardError> {
    wizard.next(StepInput::Mesh(options.mesh))?;
    wizard.next(StepInput::Colors {
        frame: options.frame_color,
        mesh: options.mesh_color,
    })?;
    wizard.next(StepInput::Image(image))?;
    wizard.next(StepInput::Continue)?;
    Ok(())
}

pub fn load_image(path: &Path) -> anyhow::Result<ImageRef> {
    let bytes = fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(ImageRef::new(file_name, content_type_for(path), bytes))
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use visualizer_core::wizard::{FrameColor, MeshChoice, MeshColor};

    use super::*;

    fn options() -> ScreenOptions {
        ScreenOptions {
            image: PathBuf::from("house.jpg"),
            mesh: MeshChoice::Standard10x10,
            frame_color: FrameColor::White,
            mesh_color: MeshColor::Bronze,
            no_track: false,
        }
    }

    fn image() -> ImageRef {
        ImageRef::new("house.jpg", "image/jpeg", b"jpeg".to_vec())
    }

    #[test]
    fn flat_answers_become_a_payload() {
        let payload = flat_payload(&[Category::Door], &options(), image()).unwrap();
        assert_eq!(payload.categories, vec![Category::Door]);
        assert_eq!(payload.mesh_choice, MeshChoice::Standard10x10);
        assert_eq!(payload.frame_color, FrameColor::White);
        assert_eq!(payload.mesh_color, MeshColor::Bronze);
        assert!(payload.scope.is_none());
    }

    #[test]
    fn flat_flow_needs_a_category() {
        assert_eq!(
            flat_payload(&[], &options(), image()),
            Err(WizardError::CategoriesRequired)
        );
    }

    #[test]
    fn door_type_is_dropped_without_doors() {
        let answers = ScopeAnswers {
            windows: true,
            door_type: Some(DoorType::SlidingDoor),
            ..ScopeAnswers::default()
        };
        let payload = scoped_payload(answers, &options(), image()).unwrap();
        let scope = payload.scope.expect("scope");
        assert!(scope.has_windows());
        assert_eq!(scope.door_type(), None);
        assert_eq!(payload.categories, vec![Category::Window]);
    }

    #[test]
    fn doors_default_to_security_door() {
        let answers = ScopeAnswers {
            doors: true,
            ..ScopeAnswers::default()
        };
        let payload = scoped_payload(answers, &options(), image()).unwrap();
        assert_eq!(payload.scope.unwrap().door_type(), Some(DoorType::SecurityDoor));
    }

    #[test]
    fn image_type_follows_extension() {
        assert_eq!(content_type_for(Path::new("a/b/House.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("shot.png")), "image/png");
        assert_eq!(content_type_for(Path::new("notes")), "application/octet-stream");
    }
}
