//! CLI enum types for capture profile and source selection.

use clap::ValueEnum;

use classifier_studio::session::CaptureProfile;
use classifier_studio::source::SourceKind;

/// What kind of collection is being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Profile {
    #[default]
    Classifier,
    Face,
}

impl From<Profile> for CaptureProfile {
    fn from(p: Profile) -> Self {
        match p {
            Profile::Classifier => CaptureProfile::Classifier,
            Profile::Face => CaptureProfile::FaceEnrollment,
        }
    }
}

/// Camera backend to replay frames through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Source {
    #[default]
    Webcam,
    CameraModule,
}

impl From<Source> for SourceKind {
    fn from(s: Source) -> Self {
        match s {
            Source::Webcam => SourceKind::Webcam,
            Source::CameraModule => SourceKind::CameraModule,
        }
    }
}
