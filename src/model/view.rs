//! Platform independent payloads produced by the renderer.

/// Author line of an embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: Option<String>,
    pub url: Option<String>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool
}

/// Rich embed content. The footer icon is filled in by the platform with the
/// bot's avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedView {
    pub author: EmbedAuthor,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub footer: String
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger
}

/// Fixed identifiers of the control buttons, routed back by the command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Skip,
    Pause,
    Resume,
    Stop,
    Queue,
    Loop,
    VolumeDown,
    VolumeUp,
    Clear,
    Shuffle
}

impl ControlAction {
    pub fn custom_id(self) -> &'static str {
        match self {
            Self::Skip => "music_skip",
            Self::Pause => "music_pause",
            Self::Resume => "music_resume",
            Self::Stop => "music_stop",
            Self::Queue => "music_queue",
            Self::Loop => "music_loop",
            Self::VolumeDown => "music_volume_down",
            Self::VolumeUp => "music_volume_up",
            Self::Clear => "music_clear",
            Self::Shuffle => "music_shuffle"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Action {
        action: ControlAction,
        emoji: &'static str,
        label: Option<String>,
        style: ButtonStyle
    },
    Link {
        label: String,
        url: String
    }
}

/// A row of buttons shown below the embed.
pub type ButtonRow = Vec<Button>;

/// Everything needed to send or edit the status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedPayload {
    pub embed: EmbedView,
    pub components: Vec<ButtonRow>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Playing,
    Listening,
    Watching
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceView {
    pub text: String,
    pub kind: ActivityKind
}

/// Texts applied to a voice channel, one per method of the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceDisplayText {
    pub status: String,
    pub topic: String,
    pub name: String
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceDisplay {
    Set(VoiceDisplayText),
    Clear
}
