//! `promodesk slider` - print the public page as a visitor would see it.

use anyhow::Result;
use chrono::Utc;

use promodesk::banner::public_banner;
use promodesk::slider::Slider;
use promodesk::ui;

use super::Context;

/// Print the banner, header texts and every slide.
///
/// Never fails on backend errors; the page falls back to built-in content.
pub async fn execute(ctx: &Context) -> Result<()> {
    let mut slider = Slider::new(ctx.api.clone()).with_timeout(ctx.timeout());
    let (banner, ()) = tokio::join!(
        public_banner(ctx.api.as_ref(), ctx.timeout(), Utc::now()),
        slider.load()
    );

    print!("{}", ui::format_banner(&banner));
    println!();
    print!("{}", ui::format_slider(slider.settings(), slider.images()));
    Ok(())
}
