use serde::Serialize;

use crate::payments::types::SessionToken;

/// Hidden form posted to the hosted payment page. The browser-side script
/// auto-submits it on load; the button is the fallback when scripting is
/// disabled.
#[derive(Debug, Clone, Serialize)]
pub struct RedirectForm {
    pub action: String,
    pub token: SessionToken,
}

impl RedirectForm {
    pub fn new(action: impl Into<String>, token: SessionToken) -> Self {
        Self {
            action: action.into(),
            token,
        }
    }

    pub fn into_html(self) -> String {
        format!(
            concat!(
                r#"<div class="checkout-help">Please wait while you are redirected to the "#,
                r#"payment server. If nothing happens within 10 seconds, please click on "#,
                r#"the button below.</div>"#,
                "\n",
                r#"<form method="post" class="formpay-payment-redirect-form" action="{action}" "#,
                r#"id="formAuthorizeNetPaymentPage" name="formAuthorizeNetPaymentPage">"#,
                "\n",
                r#"<input type="hidden" name="token" value="{token}" />"#,
                r#"<button id="btnContinue">Continue to Authorize.Net Payment Page</button>"#,
                "\n",
                r#"</form>"#,
            ),
            action = escape_html(&self.action),
            token = escape_html(self.token.as_str()),
        )
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
