//! Page rendering.
//!
//! Handlers only need `render(template, data)`; the [`Renderer`] trait is
//! that capability, injected through `AppState`. [`HtmlTemplates`] is the
//! built-in implementation used by the binary.

use std::fmt::Write as _;

/// Named page templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Index,
    Register,
    Login,
    Game,
}

impl Template {
    pub fn name(&self) -> &'static str {
        match self {
            Template::Index => "index.html",
            Template::Register => "register.html",
            Template::Login => "login.html",
            Template::Game => "game.html",
        }
    }
}

/// Payload handed to a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageData<'a> {
    Empty,
    Session { authenticated: bool },
    Message(&'a str),
}

pub trait Renderer: Send + Sync {
    fn render(&self, template: Template, data: PageData<'_>) -> String;
}

/// Minimal server-rendered HTML pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTemplates;

impl Renderer for HtmlTemplates {
    fn render(&self, template: Template, data: PageData<'_>) -> String {
        let mut body = String::new();
        match template {
            Template::Index => {
                body.push_str("<h1>Panurge</h1>\n");
                if matches!(data, PageData::Session { authenticated: true }) {
                    body.push_str(
                        "<p>Welcome back.</p>\n\
                         <nav><a href=\"/game\">Play</a> <a href=\"/logout\">Log out</a></nav>\n",
                    );
                } else {
                    body.push_str(
                        "<nav><a href=\"/login\">Log in</a> <a href=\"/register\">Register</a></nav>\n",
                    );
                }
            }
            Template::Register => {
                body.push_str("<h1>Register</h1>\n");
                push_message(&mut body, data);
                body.push_str(
                    "<form method=\"post\" action=\"/register\">\n\
                     <input name=\"username\" placeholder=\"username\" required>\n\
                     <input name=\"email\" type=\"email\" placeholder=\"email\" required>\n\
                     <input name=\"password\" type=\"password\" placeholder=\"password\" required>\n\
                     <button type=\"submit\">Register</button>\n\
                     </form>\n",
                );
            }
            Template::Login => {
                body.push_str("<h1>Log in</h1>\n");
                push_message(&mut body, data);
                body.push_str(
                    "<form method=\"post\" action=\"/login\">\n\
                     <input name=\"username\" placeholder=\"username\" required>\n\
                     <input name=\"password\" type=\"password\" placeholder=\"password\" required>\n\
                     <label><input name=\"persist\" type=\"checkbox\" value=\"true\"> Remember me</label>\n\
                     <button type=\"submit\">Log in</button>\n\
                     </form>\n",
                );
            }
            Template::Game => {
                body.push_str(
                    "<h1>Game</h1>\n\
                     <div id=\"board\"></div>\n\
                     <nav><a href=\"/logout\">Log out</a></nav>\n",
                );
            }
        }
        layout(template, &body)
    }
}

fn layout(template: Template, body: &str) -> String {
    let mut page = String::with_capacity(body.len() + 160);
    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Panurge - {}</title></head>\n<body>\n{}</body>\n</html>\n",
        template.name().trim_end_matches(".html"),
        body
    );
    page
}

fn push_message(body: &mut String, data: PageData<'_>) {
    if let PageData::Message(message) = data {
        body.push_str("<p class=\"message\">");
        body.push_str(&escape_html(message));
        body.push_str("</p>\n");
    }
}

/// Escape text for an HTML element body or quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
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
