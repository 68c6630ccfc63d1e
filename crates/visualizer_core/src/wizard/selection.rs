use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::WizardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Window,
    Door,
    Patio,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Window, Category::Door, Category::Patio];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Window => "window",
            Category::Door => "door",
            Category::Patio => "patio",
        }
    }
}

impl FromStr for Category {
    type Err = WizardError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "window" | "windows" => Ok(Category::Window),
            "door" | "doors" => Ok(Category::Door),
            "patio" => Ok(Category::Patio),
            other => Err(WizardError::UnknownOption {
                field: "category",
                value: other.to_string(),
            }),
        }
    }
}

/// Declares a closed option set with wire names, a default, and parsing.
macro_rules! option_set {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, default = $default:ident,
        { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name sent over the wire and shown to the user.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = WizardError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let wanted = raw.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|option| {
                        option.as_str().eq_ignore_ascii_case(wanted)
                            || option.as_str().replace(' ', "_").eq_ignore_ascii_case(wanted)
                    })
                    .ok_or_else(|| WizardError::UnknownOption {
                        field: $field,
                        value: wanted.to_string(),
                    })
            }
        }
    };
}

option_set!(
    /// Mesh strength.
    MeshChoice, "mesh_choice", default = Security12x12,
    {
        Standard10x10 => "10x10",
        Security12x12 => "12x12",
        American12x12 => "12x12_american",
    }
);

option_set!(
    FrameColor, "frame_color", default = Black,
    {
        Black => "Black",
        DarkBronze => "Dark Bronze",
        Stucco => "Stucco",
        White => "White",
        Almond => "Almond",
    }
);

option_set!(
    MeshColor, "mesh_color", default = Black,
    {
        Black => "Black",
        Stucco => "Stucco",
        Bronze => "Bronze",
    }
);

option_set!(
    DoorType, "door_type", default = SecurityDoor,
    {
        SecurityDoor => "security_door",
        FrenchDoor => "french_door",
        SlidingDoor => "sliding_door",
    }
);

/// Uploaded photo. Opaque to the wizard apart from being present.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageRef {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRef")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Answers collected by the branching scope questions.
///
/// `door_type` is only ever `Some` while `has_doors` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeSelection {
    has_patio: bool,
    has_windows: bool,
    has_doors: bool,
    door_type: Option<DoorType>,
}

impl ScopeSelection {
    pub fn has_patio(&self) -> bool {
        self.has_patio
    }

    pub fn has_windows(&self) -> bool {
        self.has_windows
    }

    pub fn has_doors(&self) -> bool {
        self.has_doors
    }

    pub fn door_type(&self) -> Option<DoorType> {
        self.door_type
    }

    pub fn categories(&self) -> BTreeSet<Category> {
        [
            (self.has_windows, Category::Window),
            (self.has_doors, Category::Door),
            (self.has_patio, Category::Patio),
        ]
        .into_iter()
        .filter_map(|(chosen, category)| chosen.then_some(category))
        .collect()
    }

    pub(crate) fn set_patio(&mut self, value: bool) {
        self.has_patio = value;
    }

    pub(crate) fn set_windows(&mut self, value: bool) {
        self.has_windows = value;
    }

    pub(crate) fn set_doors(&mut self, value: bool) {
        self.has_doors = value;
        if !value {
            self.door_type = None;
        }
    }

    pub(crate) fn set_door_type(&mut self, door_type: DoorType) {
        if self.has_doors {
            self.door_type = Some(door_type);
        }
    }
}

/// Single-writer order state. Only the wizard transitions mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WizardSelection {
    categories: BTreeSet<Category>,
    mesh_choice: MeshChoice,
    frame_color: FrameColor,
    mesh_color: MeshColor,
    scope: Option<ScopeSelection>,
    image: Option<ImageRef>,
}

impl WizardSelection {
    pub fn categories(&self) -> &BTreeSet<Category> {
        &self.categories
    }

    pub fn mesh_choice(&self) -> MeshChoice {
        self.mesh_choice
    }

    pub fn frame_color(&self) -> FrameColor {
        self.frame_color
    }

    pub fn mesh_color(&self) -> MeshColor {
        self.mesh_color
    }

    pub fn scope(&self) -> Option<&ScopeSelection> {
        self.scope.as_ref()
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    pub(crate) fn set_categories(&mut self, categories: BTreeSet<Category>) {
        self.categories = categories;
    }

    pub(crate) fn set_mesh_choice(&mut self, mesh_choice: MeshChoice) {
        self.mesh_choice = mesh_choice;
    }

    pub(crate) fn set_colors(&mut self, frame: FrameColor, mesh: MeshColor) {
        self.frame_color = frame;
        self.mesh_color = mesh;
    }

    pub(crate) fn set_image(&mut self, image: ImageRef) {
        self.image = Some(image);
    }

    pub(crate) fn scope_mut(&mut self) -> &mut ScopeSelection {
        self.scope.get_or_insert_with(ScopeSelection::default)
    }

    /// Re-derives the category set from the scope answers.
    pub(crate) fn sync_categories_from_scope(&mut self) {
        if let Some(scope) = &self.scope {
            self.categories = scope.categories();
        }
    }
}
