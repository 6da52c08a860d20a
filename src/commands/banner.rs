//! `promodesk banner` - show or edit the discount banner.

use anyhow::Result;

use promodesk::api::ImagePayload;
use promodesk::banner::BannerEditor;
use promodesk::status::StatusMessage;
use promodesk::ui;

use super::{Context, report};
use crate::BannerAction;

/// Execute a banner action.
pub async fn execute(ctx: &Context, action: BannerAction) -> Result<()> {
    let mut editor = BannerEditor::new(ctx.api.clone()).with_timeout(ctx.timeout());

    match action {
        BannerAction::Show => {
            editor.load().await.map_err(report)?;
            print!("{}", ui::format_banner(editor.banner()));
            Ok(())
        },
        BannerAction::Update {
            heading,
            description,
            discount,
            date,
            image,
        } => {
            let credential = ctx.credential()?;
            // Start from the stored banner so unspecified fields survive. With
            // none stored (or an unreadable one) the default form is used and
            // validation reports whatever the flags leave missing.
            if let Err(e) = editor.load().await {
                ui::print_status(&StatusMessage::Error(format!(
                    "Warning: could not load the stored banner ({e}); starting from an empty form"
                )));
            }

            let form = editor.banner_mut();
            if let Some(heading) = heading {
                form.heading = heading;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(discount) = discount {
                form.discount_percentage = discount;
            }
            if let Some(date) = date {
                form.date = date;
            }
            if let Some(path) = image {
                let payload = ImagePayload::load(&path).await.map_err(report)?;
                editor.stage_image(Some(payload));
            }

            editor.submit(&credential).await.map_err(report)?;
            if let Some(message) = editor.message() {
                ui::print_status(message);
            }
            println!();
            print!("{}", ui::format_banner(editor.banner()));
            Ok(())
        },
    }
}
