use chrono::NaiveDateTime;
use photosync_core::{extract_command, MediaKind, MediaObject};
use photosync_telegram::{Attachment, Message};

/// Pick the media object carried by `message`, if any.
///
/// The first present field wins, in the order photo (largest size), document,
/// video, animation, audio, voice, video note.
pub fn extract_media(message: &Message, now: NaiveDateTime) -> Option<MediaObject> {
    let (kind, file_id, supplied_name, mime_type, size_bytes) =
        match message.photo.as_ref().and_then(|sizes| sizes.last()) {
            Some(photo) => (
                MediaKind::Photo,
                photo.file_id.clone(),
                None,
                None,
                photo.file_size,
            ),
            None => {
                let (kind, attachment) = first_attachment(message)?;
                (
                    kind,
                    attachment.file_id.clone(),
                    supplied_name(kind, attachment),
                    attachment.mime_type.clone(),
                    attachment.file_size,
                )
            }
        };

    Some(MediaObject {
        file_id,
        original_name: supplied_name.unwrap_or_else(|| kind.default_file_name(now)),
        kind,
        size_bytes,
        mime_type,
        caption: message.caption.clone(),
        chat_label: message.chat.title.clone(),
        explicit_command: message_command(message),
        chat_id: message.chat.id,
    })
}

/// Command from the message text, falling back to the caption
pub fn message_command(message: &Message) -> Option<String> {
    message
        .text
        .as_deref()
        .and_then(extract_command)
        .or_else(|| message.caption.as_deref().and_then(extract_command))
}

fn first_attachment(message: &Message) -> Option<(MediaKind, &Attachment)> {
    [
        (MediaKind::Document, message.document.as_ref()),
        (MediaKind::Video, message.video.as_ref()),
        (MediaKind::Animation, message.animation.as_ref()),
        (MediaKind::Audio, message.audio.as_ref()),
        (MediaKind::Voice, message.voice.as_ref()),
        (MediaKind::VideoNote, message.video_note.as_ref()),
    ]
    .into_iter()
    .find_map(|(kind, attachment)| attachment.map(|a| (kind, a)))
}

/// Voice and video notes are always given a generated name
fn supplied_name(kind: MediaKind, attachment: &Attachment) -> Option<String> {
    match kind {
        MediaKind::Voice | MediaKind::VideoNote => None,
        _ => attachment
            .file_name
            .clone()
            .filter(|name| !name.trim().is_empty()),
    }
}
