//! Single-expression page actions and the text helpers the scenarios share.

use anyhow::{ensure, Context, Result};
use gauntlet_browser::chromium::style::js_string;
use gauntlet_browser::chromium::{GauntletElement, GauntletPage};

/// Reply the standing dialog responder types into every prompt it accepts.
pub const PROMPT_REPLY: &str = "new text";

/// Non-breaking space, as used by the playground's trick labels.
pub const NBSP: char = '\u{a0}';

/// Click the navigation link pointing at `href`.
pub async fn click_href_link(page: &GauntletPage, href: &str) -> Result<()> {
    page.find_element(&format!("a[href=\"{href}\"]"))
        .await
        .with_context(|| format!("no link to {href}"))?
        .click()
        .await
}

/// Click the first element matching `selector`.
pub async fn click_button(page: &GauntletPage, selector: &str) -> Result<()> {
    page.find_element(selector).await?.click().await
}

/// Find the one button whose visible text equals `label` exactly.
///
/// The comparison is byte-exact, so a label written with U+00A0 is only
/// found when `label` contains U+00A0 too. Returns `None` when nothing
/// matches and fails when the label is ambiguous.
pub async fn button_with_exact_text(
    page: &GauntletPage,
    label: &str,
) -> Result<Option<GauntletElement>> {
    let mut found = None;
    for button in page.find_elements("button").await? {
        if button.inner_text().await? == label {
            ensure!(found.is_none(), "more than one button labeled {label:?}");
            found = Some(button);
        }
    }
    Ok(found)
}

/// Click `inner` inside the shadow root hosted by `host`.
///
/// Shadow roots are invisible to CSS lookup from the document, so the click
/// is dispatched by the page itself.
pub async fn shadow_click(page: &GauntletPage, host: &str, inner: &str) -> Result<()> {
    let script = format!(
        r#"(() => {{
            const root = document.querySelector({host})?.shadowRoot;
            const el = root && root.querySelector({inner});
            if (!el) return false;
            el.click();
            return true;
        }})()"#,
        host = js_string(host),
        inner = js_string(inner),
    );
    let clicked: bool = page.evaluate(&script).await?;
    ensure!(clicked, "no {inner:?} inside the shadow root of {host:?}");
    Ok(())
}

/// Read the `value` property of `inner` inside `host`'s shadow root.
pub async fn shadow_value(page: &GauntletPage, host: &str, inner: &str) -> Result<String> {
    let script = format!(
        r#"(() => {{
            const root = document.querySelector({host})?.shadowRoot;
            const el = root && root.querySelector({inner});
            return el ? el.value : null;
        }})()"#,
        host = js_string(host),
        inner = js_string(inner),
    );
    let value: Option<String> = page.evaluate(&script).await?;
    value.with_context(|| format!("no {inner:?} inside the shadow root of {host:?}"))
}

/// The measured value in a warning label like `"Chrome CPU: 42%"`: its
/// third whitespace-separated token.
pub fn warning_cpu_token(label: &str) -> Option<&str> {
    label.split_whitespace().nth(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_token_is_the_third_word() {
        assert_eq!(warning_cpu_token("Chrome CPU: 42%"), Some("42%"));
        assert_eq!(warning_cpu_token("Chrome  CPU:   7.5%"), Some("7.5%"));
    }

    #[test]
    fn short_labels_have_no_token() {
        assert_eq!(warning_cpu_token("Chrome CPU:"), None);
        assert_eq!(warning_cpu_token(""), None);
    }

    #[test]
    fn nbsp_differs_from_plain_space() {
        let tricky = format!("My{NBSP}Button");
        assert_ne!(tricky, "My Button");
        assert_eq!(
            gauntlet_browser::chromium::style::normalize_nbsp(&tricky),
            "My Button"
        );
    }
}
