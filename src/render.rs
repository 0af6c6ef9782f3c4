//! Pure mapping from a snapshot, or the lack of one, to the three views.

use std::time::Duration;

use crate::config::Branding;
use crate::model::snapshot::NowPlayingSnapshot;
use crate::model::view::{
    ActivityKind,
    Button,
    ButtonRow,
    ButtonStyle,
    ControlAction,
    EmbedAuthor,
    EmbedField,
    EmbedPayload,
    EmbedView,
    PresenceView,
    VoiceDisplay,
    VoiceDisplayText
};

pub const ACTIVE_COLOR: u32 = 0x9966FF;
pub const PAUSED_COLOR: u32 = 0xFFA500;

pub const IDLE_PRESENCE: &str = "🎵 Ready for music!";

/// Prefix of every text written to a voice channel.
pub const DISPLAY_MARKER: &str = "🎵";

/// Longest title kept in the channel name form.
const SHORT_TITLE_LEN: usize = 15;

/// Formats a duration as `minutes:seconds`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn render_embed(snapshot: Option<&NowPlayingSnapshot>, branding: &Branding) -> EmbedPayload {
    match snapshot {
        Some(snapshot) => EmbedPayload {
            embed: active_embed(snapshot, branding),
            components: controls(snapshot, branding)
        },
        None => EmbedPayload {
            embed: idle_embed(branding),
            components: Vec::new()
        }
    }
}

pub fn render_presence(snapshot: Option<&NowPlayingSnapshot>) -> PresenceView {
    match snapshot {
        Some(snapshot) => PresenceView {
            text: format!("🎵 {}", snapshot.title),
            kind: ActivityKind::Listening
        },
        None => PresenceView {
            text: IDLE_PRESENCE.to_string(),
            kind: ActivityKind::Watching
        }
    }
}

pub fn render_server_count(servers: usize) -> PresenceView {
    PresenceView {
        text: format!("🎸 Music in {servers} servers"),
        kind: ActivityKind::Playing
    }
}

pub fn render_voice_display(snapshot: Option<&NowPlayingSnapshot>) -> VoiceDisplay {
    let Some(snapshot) = snapshot else { return VoiceDisplay::Clear };

    VoiceDisplay::Set(VoiceDisplayText {
        status: format!("{DISPLAY_MARKER} {}", snapshot.title),
        topic: format!("{DISPLAY_MARKER} Most játszott: {}", snapshot.title),
        name: format!("{DISPLAY_MARKER} {}", shorten(&snapshot.title, SHORT_TITLE_LEN))
    })
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

fn idle_embed(branding: &Branding) -> EmbedView {
    EmbedView {
        author: author(branding.title.clone(), branding),
        description: [
            "",
            "- Egyszerűen írja be a **dal nevét** vagy a **YouTube linkjét**, és kezdődhet a buli!",
            "- Jelenleg csak a **YouTube**-ot támogatom.",
            "",
            "✨ *Készen állsz arra, hogy ezt a helyet zenével töltsd meg?*"
        ].join("\n"),
        color: ACTIVE_COLOR,
        fields: vec![
            field("🎯 Például", &[
                "• `shape of you`",
                "• `lofi hip hop beats`",
                "• `https://youtu.be/dQw4w9WgXcQ`",
                "• `imagine dragons believer`"
            ], true),
            field("🚀 Mit tudok én mint DJ?", &[
                "• 🎵 Kiváló minőségű hang",
                "• 📜 Lejátszásilista kezelés",
                "• 🔁 Ismétlés & Keverő mód",
                "• 🎛️ Hangerő szabályzás",
                "• ⚡ Villámgyors keresés"
            ], true),
            field("💡 Pro Tippek", &[
                "• Először csatlakozz egy hangcsatornához",
                "• Használj konkrét dalneveket",
                "• Próbálj ki a előadó + dal kombinációt",
                "• A lejátszási listák támogatottak!"
            ], false)
        ],
        thumbnail: None,
        image: Some(branding.idle_image.clone()),
        footer: branding.footer.clone()
    }
}

fn active_embed(snapshot: &NowPlayingSnapshot, branding: &Branding) -> EmbedView {
    let requester = snapshot.requester
        .map(|id| format!("<@{id}>"))
        .unwrap_or_else(|| "Unknown".to_string());

    EmbedView {
        author: author(snapshot.title.clone(), branding),
        description: [
            format!("**🎤 Előadó:** {}", snapshot.author),
            format!("**👤 Beküldő:** {requester}"),
            String::new(),
            format!("⏰ **Hossz:** `{}`", format_duration(snapshot.duration)),
            format!("{} **Ismétlés:** `{}`", snapshot.loop_mode.glyph(), snapshot.loop_mode),
            format!("🔊 **Hangerő:** `{}%`", snapshot.volume),
            format!("{} **Állapot:** {}", status_glyph(snapshot.paused), status_text(snapshot.paused)),
            String::new(),
            "🎶 *Élvezed a hangulatot? Tegyél próbára mégtöbb dallal és élvezd a pillanatot!*".to_string()
        ].join("\n"),
        color: if snapshot.paused { PAUSED_COLOR } else { ACTIVE_COLOR },
        fields: Vec::new(),
        thumbnail: snapshot.thumbnail.as_ref().map(|t| t.as_str().to_string()),
        image: (!snapshot.paused).then(|| branding.playing_image.clone()),
        footer: branding.footer.clone()
    }
}

fn status_glyph(paused: bool) -> &'static str {
    if paused { "⏸️" } else { "▶️" }
}

fn status_text(paused: bool) -> &'static str {
    if paused { "Szüneteltetve" } else { "Most játszott" }
}

fn author(name: String, branding: &Branding) -> EmbedAuthor {
    EmbedAuthor {
        name,
        icon_url: Some(branding.icon_url.clone()),
        url: Some(branding.invite_url.clone())
    }
}

fn field(name: &str, lines: &[&str], inline: bool) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value: lines.join("\n"),
        inline
    }
}

fn action(action: ControlAction, emoji: &'static str, style: ButtonStyle) -> Button {
    Button::Action {
        action,
        emoji,
        label: None,
        style
    }
}

fn controls(snapshot: &NowPlayingSnapshot, branding: &Branding) -> Vec<ButtonRow> {
    let (toggle, toggle_emoji) = if snapshot.paused {
        (ControlAction::Resume, "▶️")
    } else {
        (ControlAction::Pause, "⏸️")
    };

    vec![
        vec![
            action(ControlAction::Skip, "⏭️", ButtonStyle::Primary),
            action(toggle, toggle_emoji, ButtonStyle::Success),
            action(ControlAction::Stop, "🛑", ButtonStyle::Danger),
            action(ControlAction::Queue, "📜", ButtonStyle::Success),
            Button::Action {
                action: ControlAction::Loop,
                emoji: snapshot.loop_mode.glyph(),
                label: Some("Loop".to_string()),
                style: ButtonStyle::Primary
            }
        ],
        vec![
            action(ControlAction::VolumeDown, "🔉", ButtonStyle::Secondary),
            action(ControlAction::VolumeUp, "🔊", ButtonStyle::Secondary),
            action(ControlAction::Clear, "🗑️", ButtonStyle::Secondary),
            action(ControlAction::Shuffle, "🔀", ButtonStyle::Secondary),
            Button::Link {
                label: "Support".to_string(),
                url: branding.support_url.clone()
            }
        ]
    ]
}
