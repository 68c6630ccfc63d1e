use super::{
    Category, FrameColor, ImageRef, MeshChoice, MeshColor, ScopeSelection, WizardError,
    WizardSelection,
};

/// Screen type sent in the legacy compatibility field.
pub const LEGACY_SCREEN_TYPE: &str = "window_fixed";

/// Job-creation request assembled from a completed wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    /// Sorted, de-duplicated.
    pub categories: Vec<Category>,
    pub scope: Option<ScopeSelection>,
    pub mesh_choice: MeshChoice,
    pub frame_color: FrameColor,
    pub mesh_color: MeshColor,
    pub image: ImageRef,
}

impl SubmissionPayload {
    pub fn from_selection(selection: &WizardSelection) -> Result<Self, WizardError> {
        let image = selection.image().cloned().ok_or(WizardError::ImageRequired)?;
        Ok(Self {
            categories: selection.categories().iter().copied().collect(),
            scope: selection.scope().copied(),
            mesh_choice: selection.mesh_choice(),
            frame_color: selection.frame_color(),
            mesh_color: selection.mesh_color(),
            image,
        })
    }

    /// Text fields of the multipart form, in submission order. The image is
    /// sent separately as `original_image`.
    pub fn text_fields(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut fields = vec![
            ("screen_categories", serde_json::to_string(&self.categories)?),
            ("mesh_choice", self.mesh_choice.as_str().to_string()),
            ("frame_color", self.frame_color.as_str().to_string()),
            ("mesh_color", self.mesh_color.as_str().to_string()),
            ("screen_type", LEGACY_SCREEN_TYPE.to_string()),
            ("mesh_type", self.mesh_choice.as_str().to_string()),
            ("color", self.frame_color.as_str().to_string()),
        ];
        if let Some(scope) = &self.scope {
            fields.push(("has_patio", scope.has_patio().to_string()));
            fields.push(("has_windows", scope.has_windows().to_string()));
            fields.push(("has_doors", scope.has_doors().to_string()));
            if let Some(door_type) = scope.door_type() {
                fields.push(("door_type", door_type.as_str().to_string()));
            }
        }
        Ok(fields)
    }
}
