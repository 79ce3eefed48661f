//! Server-rendered pages.
//!
//! Every template is compiled into the binary with `include_str!` and
//! registered once at startup. Pages share the `header` and `footer`
//! partials, which expect the [`PageContext`] fields at the top level.

use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Response};
use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use crate::error::AppResult;
use crate::flash::{clear_flash_cookie, IncomingFlash};

pub const BOOK_LIST: &str = "book_list";
pub const BOOK_DETAIL: &str = "book_detail";
pub const BOOK_FORM: &str = "book_form";
pub const BOOK_CONFIRM_DELETE: &str = "book_confirm_delete";
pub const ADMIN_BOOK_CHANGELIST: &str = "admin_book_changelist";

const PARTIALS: &[(&str, &str)] = &[
    ("header", include_str!("../templates/header.hbs")),
    ("footer", include_str!("../templates/footer.hbs")),
];

const PAGES: &[(&str, &str)] = &[
    (BOOK_LIST, include_str!("../templates/book_list.hbs")),
    (BOOK_DETAIL, include_str!("../templates/book_detail.hbs")),
    (BOOK_FORM, include_str!("../templates/book_form.hbs")),
    (
        BOOK_CONFIRM_DELETE,
        include_str!("../templates/book_confirm_delete.hbs"),
    ),
    (
        ADMIN_BOOK_CHANGELIST,
        include_str!("../templates/admin_book_changelist.hbs"),
    ),
];

/// Values every page layout needs, with the page's own data flattened in.
#[derive(Debug, Serialize)]
pub struct PageContext<'a, T: Serialize> {
    pub page_title: &'a str,
    pub flash: Option<&'a str>,
    #[serde(flatten)]
    pub content: &'a T,
}

/// Compiled template registry.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    /// Compile the partials and page templates embedded in the binary.
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        for (name, source) in PARTIALS {
            registry.register_partial(name, *source)?;
        }
        for (name, source) in PAGES {
            registry.register_template_string(name, *source)?;
        }
        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, RenderError> {
        self.registry.render(name, data)
    }

    /// Render a full page as a `200 OK` HTML response.
    ///
    /// When the request carried a flash message it is shown on this page
    /// and the cookie is cleared in the same response.
    pub fn page<T: Serialize>(
        &self,
        name: &str,
        page_title: &str,
        flash: &IncomingFlash,
        content: &T,
    ) -> AppResult<Response> {
        let html = self.render(
            name,
            &PageContext {
                page_title,
                flash: flash.message(),
                content,
            },
        )?;

        let mut response = Html(html).into_response();
        if flash.message().is_some() {
            if let Some(value) = clear_flash_cookie() {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        Ok(response)
    }
}
