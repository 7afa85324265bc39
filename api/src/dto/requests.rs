use crate::{
    errors::ApiError,
    files::{FileStore, StoredFile},
};
use axum::extract::{Multipart, multipart::Field};

/// Body of `POST /posts` once the multipart stream has been read.
///
/// The image is already on disk by the time this exists.
#[derive(Debug)]
pub struct UploadForm {
    pub caption: Option<String>,
    pub image: StoredFile,
}

impl UploadForm {
    pub const IMAGE_FIELD: &'static str = "image";
    pub const CAPTION_FIELD: &'static str = "caption";

    /// Reads the whole multipart body, streaming the `image` part into
    /// `files` chunk by chunk.
    ///
    /// Exactly one `image` part is required. Any other part carrying a file
    /// name is rejected; stray text parts are skipped. When the request is
    /// rejected after the image was written, the file is removed again.
    pub async fn from_multipart(
        mut multipart: Multipart,
        files: &FileStore,
    ) -> Result<Self, ApiError> {
        let mut caption = None;
        let mut image: Option<StoredFile> = None;

        let read: Result<(), ApiError> = async {
            while let Some(field) = multipart.next_field().await? {
                let name = field.name().unwrap_or_default().to_owned();

                if name == Self::IMAGE_FIELD {
                    if image.is_some() {
                        return Err(ApiError::ValidationError(
                            "expected a single image".into(),
                        ));
                    }
                    image = Some(stream_to_disk(field, files).await?);
                } else if field.file_name().is_some() {
                    return Err(ApiError::ValidationError(format!(
                        "unexpected file field `{name}`"
                    )));
                } else if name == Self::CAPTION_FIELD {
                    caption = Some(field.text().await?);
                }
            }
            Ok(())
        }
        .await;

        match (read, image) {
            (Ok(()), Some(image)) => Ok(Self { caption, image }),
            (Ok(()), None) => Err(ApiError::MissingFile),
            (Err(e), Some(image)) => {
                files.remove(image).await;
                Err(e)
            }
            (Err(e), None) => Err(e),
        }
    }
}

async fn stream_to_disk(mut field: Field<'_>, files: &FileStore) -> Result<StoredFile, ApiError> {
    let mut pending = files.create(field.file_name()).await?;

    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                pending.discard().await;
                return Err(e.into());
            }
        };

        if let Err(e) = pending.write_chunk(&chunk).await {
            pending.discard().await;
            return Err(e.into());
        }
    }

    Ok(pending.finish().await?)
}
