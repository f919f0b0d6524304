//! Server-rendered site pages.
//!
//! Every page shares the navigation bar (current page marked active) and the
//! footer. The Live Demo page is a shell; its script drives the demo JSON API.

use axum::Form;
use axum::Router;
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use chrono::Datelike;
use serde::Deserialize;

/// Site name shown in the header and footer.
pub const SITE_NAME: &str = "EduAI";

/// A top-level page of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    HowItWorks,
    Features,
    LiveDemo,
    About,
    Contact,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Home,
        Page::HowItWorks,
        Page::Features,
        Page::LiveDemo,
        Page::About,
        Page::Contact,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::HowItWorks => "/how-it-works",
            Self::Features => "/features",
            Self::LiveDemo => "/live-demo",
            Self::About => "/about",
            Self::Contact => "/contact",
        }
    }

    /// Navigation label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::HowItWorks => "How It Works",
            Self::Features => "Features",
            Self::LiveDemo => "Live Demo",
            Self::About => "About",
            Self::Contact => "Contact",
        }
    }

    pub fn from_path(path: &str) -> Option<Page> {
        Self::ALL.into_iter().find(|p| p.path() == path)
    }
}

const HOW_IT_WORKS_STEPS: [(&str, &str); 4] = [
    (
        "Upload Content",
        "Submit your educational materials and curriculum requirements",
    ),
    (
        "AI Processing",
        "Our AI analyzes and transforms content into engaging video lessons",
    ),
    (
        "Image & Video Generation",
        "High-quality educational images and videos are created automatically",
    ),
    (
        "Ready to Use",
        "Download or stream your AI-generated educational content",
    ),
];

const FEATURES: [(&str, &str); 6] = [
    (
        "AI-Powered Content Generation",
        "Advanced algorithms create engaging educational videos tailored to your curriculum",
    ),
    (
        "Multilingual Support",
        "Automatically translate content into multiple languages for global accessibility",
    ),
    (
        "Real-time Adaptability",
        "Content adjusts based on student performance and learning patterns",
    ),
    (
        "Time-Saving",
        "Generate hours of quality content in minutes, not days",
    ),
    (
        "Collaborative Learning",
        "Foster engagement through interactive video experiences",
    ),
    (
        "Quality Assured",
        "AI-generated content reviewed for educational standards compliance",
    ),
];

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn render_nav(active: Page) -> String {
    let links: String = Page::ALL
        .iter()
        .map(|page| {
            if *page == active {
                format!(
                    r#"<a href="{}" class="nav-link active" aria-current="page">{}</a>"#,
                    page.path(),
                    page.label()
                )
            } else {
                format!(
                    r#"<a href="{}" class="nav-link">{}</a>"#,
                    page.path(),
                    page.label()
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<nav class="site-nav">
<a href="/" class="brand">{SITE_NAME}</a>
<div class="nav-links">
{links}
</div>
</nav>"#
    )
}

fn render_footer() -> String {
    let year = chrono::Utc::now().year();
    format!(
        r#"<footer class="site-footer">
<div>
<h3>About {SITE_NAME}</h3>
<p>Transforming education with AI-powered digital boards.</p>
</div>
<div>
<h3>Quick Links</h3>
<a href="/how-it-works">How It Works</a>
<a href="/features">Features</a>
<a href="/live-demo">Live Demo</a>
<a href="/about">About Us</a>
</div>
<p class="copyright">&copy; {year} {SITE_NAME}. All rights reserved.</p>
</footer>"#
    )
}

/// Wrap page content in the shared shell.
fn layout(page: Page, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} | {SITE_NAME}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 0; color: #1f2937; }}
.site-nav {{ display: flex; justify-content: space-between; padding: 1rem 2rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); }}
.brand {{ font-weight: 700; color: #7c3aed; text-decoration: none; font-size: 1.5rem; }}
.nav-link {{ margin-left: 1.5rem; color: #4b5563; text-decoration: none; }}
.nav-link.active {{ color: #7c3aed; font-weight: 600; }}
main {{ max-width: 72rem; margin: 0 auto; padding: 2rem; }}
.grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(16rem, 1fr)); gap: 1.5rem; }}
.card {{ padding: 1.5rem; border-radius: .5rem; box-shadow: 0 2px 6px rgba(0,0,0,.1); }}
.preview {{ min-height: 24rem; border-radius: .5rem; padding: 1rem; color: #fff; background: #111827; }}
.preview.ai {{ background: linear-gradient(135deg, #7c3aed, #4338ca); }}
.preview img, .preview video {{ max-width: 100%; }}
.error {{ color: #b91c1c; }}
.site-footer {{ display: flex; flex-wrap: wrap; gap: 3rem; padding: 2rem; background: #111827; color: #e5e7eb; }}
.site-footer a {{ display: block; color: #d1d5db; }}
.copyright {{ width: 100%; text-align: center; }}
</style>
</head>
<body>
{nav}
<main>
{body}
</main>
{footer}
</body>
</html>"#,
        title = page.label(),
        nav = render_nav(page),
        footer = render_footer(),
    )
}

fn render_home() -> String {
    let demo = Page::LiveDemo.path();
    let how = Page::HowItWorks.path();
    format!(
        r#"<section class="hero">
<h1>Transform Your Teaching</h1>
<p>Experience the future of education with AI-powered digital boards</p>
<a href="{demo}" class="button">Try Live Demo</a>
<a href="{how}" class="button secondary">Learn More</a>
</section>
<section class="grid">
<div class="card"><h2>Traditional Teaching</h2><p>Static content limited by physical constraints</p></div>
<div class="card"><h2>AI-Powered Learning</h2><p>Interactive content that adapts to student needs</p></div>
</section>"#
    )
}

fn render_how_it_works() -> String {
    let steps: String = HOW_IT_WORKS_STEPS
        .iter()
        .enumerate()
        .map(|(i, (title, description))| {
            format!(
                r#"<div class="card"><span class="step">{}</span><h3>{}</h3><p>{}</p></div>"#,
                i + 1,
                html_escape(title),
                html_escape(description)
            )
        })
        .collect();
    format!(
        r#"<h1>How It Works</h1>
<p>Simple steps to transform your educational content</p>
<section class="grid">
{steps}
</section>"#
    )
}

fn render_features() -> String {
    let cards: String = FEATURES
        .iter()
        .map(|(title, description)| {
            format!(r#"<div class="card"><h3>{title}</h3><p>{description}</p></div>"#)
        })
        .collect();
    format!(
        r#"<h1>Powerful Features for Modern Education</h1>
<p>Discover how our AI technology revolutionizes educational content creation</p>
<section class="grid">
{cards}
</section>"#
    )
}

fn render_about() -> String {
    format!(
        r#"<h1>About {SITE_NAME}</h1>
<p>We're revolutionizing education through AI-powered technology, making learning more engaging,
accessible, and effective for students and educators worldwide.</p>
<section class="grid">
<div class="card"><h2>Our Mission</h2>
<p>To transform traditional education by leveraging artificial intelligence, making quality
education accessible to everyone, everywhere. We believe in the power of technology to create
immersive, personalized learning experiences that inspire and empower the next generation.</p></div>
<div class="card"><h2>Our Vision</h2>
<p>We envision a future where every classroom is equipped with AI-powered tools that enhance
teaching and learning. A world where education knows no boundaries, and where every student has
access to personalized, engaging content that helps them reach their full potential.</p></div>
</section>"#
    )
}

/// A submitted contact form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// Problems with the submission, one message per field.
    pub fn validate(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("Please enter your name");
        }
        let email = self.email.trim();
        let email_ok = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !email_ok {
            problems.push("Please enter a valid email address");
        }
        if self.message.trim().is_empty() {
            problems.push("Please enter a message");
        }
        problems
    }
}

fn render_contact(form: &ContactForm, notice: Option<&str>, problems: &[&str]) -> String {
    let notice = notice
        .map(|n| format!(r#"<p class="notice">{}</p>"#, html_escape(n)))
        .unwrap_or_default();
    let problems: String = problems
        .iter()
        .map(|p| format!(r#"<p class="error">{}</p>"#, html_escape(p)))
        .collect();

    format!(
        r#"<h1>Get Started Today</h1>
<p>Ready to transform your educational content? Contact us for a demo or collaboration.</p>
{notice}
{problems}
<form method="post" action="/contact" class="card">
<label>Name <input type="text" name="name" value="{name}" required></label>
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Organization <input type="text" name="organization" value="{organization}"></label>
<label>Message <textarea name="message" rows="4" required>{message}</textarea></label>
<button type="submit">Send Message</button>
</form>"#,
        name = html_escape(&form.name),
        email = html_escape(&form.email),
        organization = html_escape(&form.organization),
        message = html_escape(&form.message),
    )
}

const LIVE_DEMO_SCRIPT: &str = r#"
const api = '/api/demo/sessions';
let session = null;

function esc(s) {
  const d = document.createElement('div');
  d.textContent = s;
  return d.innerHTML;
}

async function call(method, path, body, isForm) {
  const opts = { method, headers: {} };
  if (body !== undefined) {
    if (isForm) { opts.body = body; }
    else { opts.headers['Content-Type'] = 'application/json'; opts.body = JSON.stringify(body); }
  }
  const res = await fetch(api + '/' + session.id + path, opts);
  const data = await res.json();
  if (!res.ok) { alert(data.error); return refresh(); }
  render(data);
}

async function refresh() {
  const res = await fetch(api + '/' + session.id);
  if (res.ok) render(await res.json());
}

function render(s) {
  session = s;
  const pane = document.getElementById('preview');
  const toggle = document.getElementById('toggle');
  const speak = document.getElementById('speak');
  toggle.checked = s.mode === 'ai_enhanced';
  toggle.disabled = s.is_generating;
  document.getElementById('generate').disabled = s.is_generating || !s.text_body.trim();
  speak.hidden = s.mode !== 'ai_enhanced' || !s.generated_text;
  speak.textContent = s.is_speaking ? 'Stop' : 'Play';
  pane.className = s.mode === 'original' ? 'preview' : 'preview ai';

  let html = '';
  if (s.is_generating) {
    html = '<p>Generating AI content...</p>';
  } else if (s.mode === 'ai_enhanced') {
    if (s.generated_image_url) html += '<img src="' + esc(s.generated_image_url) + '" alt="AI-generated visualization">';
    if (s.generated_text) html += '<pre>' + esc(s.generated_text) + '</pre>';
    if (!html) html = '<p>AI-Enhanced View</p>';
    if (s.narration_url) html += '<audio autoplay src="' + esc(s.narration_url) + '"></audio>';
  } else if (s.media_kind === 'image' && s.preview_url) {
    html = '<img src="' + esc(s.preview_url) + '" alt="Content preview">';
  } else if (s.media_kind === 'video' && s.preview_url) {
    html = '<video controls src="' + esc(s.preview_url) + '"></video>';
  } else if (s.text_body) {
    html = '<pre>' + esc(s.text_body) + '</pre>';
  } else {
    html = '<p>Enter content or upload a file to begin</p>';
  }
  pane.innerHTML = html;
}

document.addEventListener('DOMContentLoaded', async () => {
  const res = await fetch(api, { method: 'POST' });
  render(await res.json());

  const text = document.getElementById('content');
  text.addEventListener('input', () => call('PUT', '/text', { text: text.value }));

  const url = document.getElementById('url');
  url.addEventListener('input', () => call('PUT', '/url', { input: url.value }));
  document.getElementById('url-form').addEventListener('submit', (e) => {
    e.preventDefault();
    call('POST', '/url', { input: url.value });
  });

  const file = document.getElementById('file');
  file.addEventListener('change', () => {
    if (!file.files.length) return;
    const form = new FormData();
    form.append('file', file.files[0]);
    call('POST', '/upload', form, true);
  });

  document.getElementById('toggle').addEventListener('change', (e) => {
    e.preventDefault();
    render(Object.assign({}, session, { is_generating: session.mode === 'original' && !session.generated_text }));
    call('POST', '/toggle');
  });
  document.getElementById('generate').addEventListener('click', () => {
    render(Object.assign({}, session, { is_generating: true }));
    call('POST', '/generate');
  });
  document.getElementById('speak').addEventListener('click', () => call('POST', '/speech'));
});

window.addEventListener('pagehide', () => {
  if (session) fetch(api + '/' + session.id, { method: 'DELETE', keepalive: true });
});
"#;

fn render_live_demo() -> String {
    format!(
        r#"<h1>Live Demo</h1>
<div class="grid">
<section class="card">
<h2>Input</h2>
<label class="switch">Original <input type="checkbox" id="toggle"> AI-Enhanced</label>
<textarea id="content" rows="10" placeholder="Enter your educational content here..."></textarea>
<form id="url-form">
<input type="text" id="url" placeholder="Or paste an image/video URL...">
<button type="submit">Load URL</button>
</form>
<button id="generate" disabled>Generate AI</button>
<label class="button">Upload File <input type="file" id="file" accept="image/*,video/*,.txt" hidden></label>
</section>
<section class="card">
<h2>Preview <button id="speak" hidden>Play</button></h2>
<div id="preview" class="preview"><p>Enter content or upload a file to begin</p></div>
</section>
</div>
<section class="card">
<h2>How to Use the Demo</h2>
<ol>
<li>Enter your educational content in the input area or upload a file</li>
<li>Your content will appear in the preview section</li>
<li>Click "Generate AI" to create an AI-enhanced version</li>
<li>The AI will generate both enhanced content and visualizations</li>
</ol>
</section>
<script>{LIVE_DEMO_SCRIPT}</script>"#
    )
}

/// Render a full page.
pub fn render_page(page: Page) -> String {
    let body = match page {
        Page::Home => render_home(),
        Page::HowItWorks => render_how_it_works(),
        Page::Features => render_features(),
        Page::LiveDemo => render_live_demo(),
        Page::About => render_about(),
        Page::Contact => render_contact(&ContactForm::default(), None, &[]),
    };
    layout(page, &body)
}

async fn show_page(page: Page) -> Html<String> {
    Html(render_page(page))
}

async fn submit_contact(Form(form): Form<ContactForm>) -> impl IntoResponse {
    let problems = form.validate();
    if !problems.is_empty() {
        let body = render_contact(&form, None, &problems);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(layout(Page::Contact, &body)),
        );
    }

    tracing::info!(
        name = %form.name.trim(),
        email = %form.email.trim(),
        organization = %form.organization.trim(),
        message_len = form.message.len(),
        "Contact form submitted"
    );

    let body = render_contact(
        &ContactForm::default(),
        Some("Thank you for reaching out! We'll be in touch soon."),
        &[],
    );
    (StatusCode::OK, Html(layout(Page::Contact, &body)))
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!(%uri, "Page not found");
    let body = r#"<h1>Page not found</h1><p><a href="/">Back to Home</a></p>"#;
    (StatusCode::NOT_FOUND, Html(layout(Page::Home, body)))
}

/// Routes for the site pages.
pub fn routes() -> Router {
    Router::new()
        .route("/", get(|| show_page(Page::Home)))
        .route("/how-it-works", get(|| show_page(Page::HowItWorks)))
        .route("/features", get(|| show_page(Page::Features)))
        .route("/live-demo", get(|| show_page(Page::LiveDemo)))
        .route("/about", get(|| show_page(Page::About)))
        .route(
            "/contact",
            get(|| show_page(Page::Contact)).post(submit_contact),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_page_marks_its_own_link_active() {
        for page in Page::ALL {
            let html = render_page(page);
            let active = format!(
                r#"<a href="{}" class="nav-link active" aria-current="page">"#,
                page.path()
            );
            assert!(html.contains(&active), "{:?}", page);
            assert_eq!(html.matches("aria-current=\"page\"").count(), 1);
        }
    }

    #[test]
    fn test_footer_on_every_page() {
        for page in Page::ALL {
            assert!(render_page(page).contains("All rights reserved."));
        }
    }

    #[test]
    fn test_page_paths_round_trip() {
        for page in Page::ALL {
            assert_eq!(Page::from_path(page.path()), Some(page));
        }
        assert_eq!(Page::from_path("/nope"), None);
    }

    #[test]
    fn test_features_and_steps_rendered() {
        let features = render_page(Page::Features);
        assert!(features.contains("Multilingual Support"));
        assert!(features.contains("Quality Assured"));

        let how = render_page(Page::HowItWorks);
        assert!(how.contains("Image &amp; Video Generation"));
        assert!(how.contains("Ready to Use"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_contact_validation() {
        let form = ContactForm {
            name: "Ada".to_string(),
            email: "ada@school.edu".to_string(),
            organization: String::new(),
            message: "Demo please".to_string(),
        };
        assert!(form.validate().is_empty());

        let form = ContactForm {
            email: "not-an-email".to_string(),
            ..ContactForm::default()
        };
        assert_eq!(form.validate().len(), 3);
    }

    #[test]
    fn test_contact_form_escapes_values() {
        let form = ContactForm {
            name: "<script>".to_string(),
            ..ContactForm::default()
        };
        let html = render_contact(&form, None, &[]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains(r#"value="<script>""#));
    }
}
