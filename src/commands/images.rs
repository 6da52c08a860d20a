//! `promodesk images` - manage the dated image collection.

use anyhow::Result;
use chrono::Local;
use std::path::Path;

use promodesk::api::ImagePayload;
use promodesk::credentials::Credential;
use promodesk::gallery::GalleryManager;
use promodesk::ui;

use super::{Context, confirm_on_stdin, report};
use crate::ImagesAction;

/// Execute an images action.
pub async fn execute(ctx: &Context, action: ImagesAction) -> Result<()> {
    let gallery = GalleryManager::new(ctx.api.clone())
        .with_timeout(ctx.timeout())
        .with_default_upload_date(Local::now().date_naive());

    match action {
        ImagesAction::List => {
            gallery.list().await.map_err(report)?;
            print!("{}", ui::format_images(&gallery.images()));
            Ok(())
        },
        ImagesAction::Upload { file, date } => {
            let credential = ctx.credential()?;
            let binary = load_optional(file.as_deref()).await?;
            let date = date.unwrap_or_else(|| gallery.default_upload_date());
            gallery
                .upload(&credential, binary, date)
                .await
                .map_err(report)?;
            finish(&gallery);
            Ok(())
        },
        ImagesAction::Delete { id, yes } => {
            let credential = ctx.credential()?;
            let deleted = if yes {
                gallery.delete(&credential, &id, &|_: &str| true).await
            } else {
                gallery.delete(&credential, &id, &confirm_on_stdin).await
            }
            .map_err(report)?;

            if deleted {
                finish(&gallery);
            } else {
                println!("Cancelled");
            }
            Ok(())
        },
        ImagesAction::SetDate { id, date } => {
            let credential = ctx.credential()?;
            open_session(&gallery, &id).await?;
            gallery.set_edit_date(date).map_err(report)?;
            commit(&gallery, &credential, Commit::DateOnly).await
        },
        ImagesAction::Replace { id, file, date } => {
            let credential = ctx.credential()?;
            let binary = ImagePayload::load(&file).await.map_err(report)?;
            open_session(&gallery, &id).await?;
            if let Some(date) = date {
                gallery.set_edit_date(date).map_err(report)?;
            }
            gallery.stage_replacement(binary).map_err(report)?;
            commit(&gallery, &credential, Commit::Replace).await
        },
    }
}

#[derive(Clone, Copy)]
enum Commit {
    DateOnly,
    Replace,
}

async fn commit(gallery: &GalleryManager, credential: &Credential, kind: Commit) -> Result<()> {
    let result = match kind {
        Commit::DateOnly => gallery.commit_date_only(credential).await,
        Commit::Replace => gallery.commit_replace(credential).await,
    };
    result.map_err(report)?;
    finish(gallery);
    Ok(())
}

/// Fetch the collection and open an edit session on `id`.
async fn open_session(gallery: &GalleryManager, id: &str) -> Result<()> {
    gallery.list().await.map_err(report)?;
    gallery.begin_edit_by_id(id).map_err(report)
}

async fn load_optional(file: Option<&Path>) -> Result<Option<ImagePayload>> {
    match file {
        Some(path) => Ok(Some(ImagePayload::load(path).await.map_err(report)?)),
        None => Ok(None),
    }
}

/// Print the status line and the refreshed collection.
fn finish(gallery: &GalleryManager) {
    if let Some(message) = gallery.message() {
        ui::print_status(&message);
    }
    println!();
    print!("{}", ui::format_images(&gallery.images()));
}
