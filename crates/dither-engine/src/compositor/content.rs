use super::scene::ChildScene;
use super::wave::{WaveControls, WaveNode, WaveParams};

/// Where the compositor's child content comes from.
pub enum ContentSource {
    /// The built-in animated wave field.
    Generated(WaveParams),
    /// A scene supplied by the host.
    Composited(ChildScene),
}

impl Default for ContentSource {
    fn default() -> Self {
        Self::Generated(WaveParams::default())
    }
}

/// A content source turned into the scene the compositor owns.
pub struct ResolvedContent {
    pub scene: ChildScene,
    /// Present for generated content.
    pub wave: Option<WaveControls>,
}

impl ContentSource {
    /// Builds the child scene. Called once when the pipeline is set up.
    pub fn resolve(self) -> ResolvedContent {
        match self {
            ContentSource::Generated(params) => {
                let node = WaveNode::new(params);
                let wave = node.controls();
                ResolvedContent {
                    scene: ChildScene::new().with(node),
                    wave: Some(wave),
                }
            }
            ContentSource::Composited(scene) => ResolvedContent { scene, wave: None },
        }
    }
}

impl From<WaveParams> for ContentSource {
    fn from(params: WaveParams) -> Self {
        Self::Generated(params)
    }
}

impl From<ChildScene> for ContentSource {
    fn from(scene: ChildScene) -> Self {
        Self::Composited(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_content_exposes_wave_controls() {
        let resolved = ContentSource::default().resolve();
        assert_eq!(resolved.scene.len(), 1);
        let wave = resolved.wave.expect("generated content has controls");
        assert_eq!(wave.get(), WaveParams::default());
    }

    #[test]
    fn composited_content_is_passed_through() {
        let resolved = ContentSource::from(ChildScene::new()).resolve();
        assert!(resolved.scene.is_empty());
        assert!(resolved.wave.is_none());
    }
}
