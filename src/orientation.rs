use serde::{Deserialize, Serialize};

/// Physical orientation of the device, as reported by the session service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    Unknown,
    FaceUp,
    FaceDown,
}

/// EXIF-style orientation of the captured image handed to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageOrientation {
    Up,
    Down,
    Left,
    Right,
}

impl DeviceOrientation {
    pub fn is_landscape(&self) -> bool {
        matches!(self, Self::LandscapeLeft | Self::LandscapeRight)
    }

    /// Orientation the sensor image must be read in for the detector to see an upright scene.
    pub fn image_orientation(&self) -> ImageOrientation {
        match self {
            Self::Portrait => ImageOrientation::Right,
            Self::LandscapeRight => ImageOrientation::Down,
            Self::PortraitUpsideDown => ImageOrientation::Left,
            // the sensor is natively landscape-left; flat and unknown poses read it as-is
            Self::LandscapeLeft | Self::Unknown | Self::FaceUp | Self::FaceDown => {
                ImageOrientation::Up
            }
        }
    }
}
