//! Article pages and write handlers
//!
//! Page handlers render a view with the flash taken for this request. Write
//! handlers validate, store an attached image, apply the change under the
//! repository write lock and redirect with a success flash.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::article::{self, ArticleError};
use crate::config::AppState;
use crate::error::AppError;
use crate::handler::router::RequestContext;
use crate::http;
use crate::logger;
use crate::session::{self, FlashMessages};
use crate::upload::{self, UploadedFile};
use crate::view::{Page, ViewModel};

type HandlerResult = Result<Response<Full<Bytes>>, AppError>;

const CREATED: &str = "Article created successfully!";
const UPDATED: &str = "Article updated successfully!";
const DELETED: &str = "Article deleted successfully!";

pub async fn index(state: &AppState, ctx: &RequestContext<'_>, flash: FlashMessages) -> HandlerResult {
    let articles = state.articles.read().await;
    let model = ViewModel::new("Home Page", flash).with_articles(articles.list());
    render(state, ctx, Page::Index, &model)
}

/// Compose form plus the management list of every article
pub async fn compose(
    state: &AppState,
    ctx: &RequestContext<'_>,
    flash: FlashMessages,
) -> HandlerResult {
    let articles = state.articles.read().await;
    let model = ViewModel::new("Compose Page", flash).with_articles(articles.list());
    render(state, ctx, Page::Compose, &model)
}

pub fn about(state: &AppState, ctx: &RequestContext<'_>, flash: FlashMessages) -> HandlerResult {
    render(state, ctx, Page::About, &ViewModel::new("About Page", flash))
}

pub async fn show(
    state: &AppState,
    ctx: &RequestContext<'_>,
    raw_id: &str,
    flash: FlashMessages,
) -> HandlerResult {
    let id = article::parse_id(raw_id)?;
    let articles = state.articles.read().await;
    let article = articles.get(id)?;
    let model = ViewModel::new(&article.title, flash).with_article(article);
    render(state, ctx, Page::Article, &model)
}

pub async fn edit(
    state: &AppState,
    ctx: &RequestContext<'_>,
    raw_id: &str,
    flash: FlashMessages,
) -> HandlerResult {
    let id = article::parse_id(raw_id)?;
    let articles = state.articles.read().await;
    let article = articles.get(id)?;
    let model = ViewModel::new("Edit Article", flash).with_article(article);
    render(state, ctx, Page::Edit, &model)
}

/// Create an article from a submitted form
pub async fn submit(state: &AppState, ctx: &RequestContext<'_>, body: Bytes) -> HandlerResult {
    let form =
        upload::parse_article_form(ctx.content_type.as_deref(), body, state.form_limits()).await?;
    form.fields.validate()?;

    let image_url = store_image(state, form.image.as_ref()).await?;
    let result = state
        .articles
        .write()
        .await
        .create(&form.fields, image_url.clone());
    let article = discard_on_error(state, result, image_url.as_deref()).await?;

    logger::log_info(&format!(
        "[Article] Created #{} \"{}\"",
        article.id, article.title
    ));
    Ok(redirect_with_flash(
        state,
        ctx,
        &format!("/articles/{}", article.id),
        CREATED,
    ))
}

/// Replace the text of an article, and its image when a new one is attached
pub async fn update(
    state: &AppState,
    ctx: &RequestContext<'_>,
    raw_id: &str,
    body: Bytes,
) -> HandlerResult {
    let id = article::parse_id(raw_id)?;
    state.articles.read().await.get(id)?;

    let form =
        upload::parse_article_form(ctx.content_type.as_deref(), body, state.form_limits()).await?;
    form.fields.validate()?;

    let image_url = store_image(state, form.image.as_ref()).await?;
    let result = state
        .articles
        .write()
        .await
        .update(id, &form.fields, image_url.clone());
    let article = discard_on_error(state, result, image_url.as_deref()).await?;

    logger::log_info(&format!(
        "[Article] Updated #{} \"{}\"",
        article.id, article.title
    ));
    Ok(redirect_with_flash(
        state,
        ctx,
        &format!("/articles/{}", article.id),
        UPDATED,
    ))
}

pub async fn delete(state: &AppState, ctx: &RequestContext<'_>, raw_id: &str) -> HandlerResult {
    let id = article::parse_id(raw_id)?;
    let removed = state.articles.write().await.delete(id)?;

    logger::log_info(&format!(
        "[Article] Deleted #{} \"{}\"",
        removed.id, removed.title
    ));
    Ok(redirect_with_flash(state, ctx, "/", DELETED))
}

fn render(
    state: &AppState,
    ctx: &RequestContext<'_>,
    page: Page,
    model: &ViewModel<'_>,
) -> HandlerResult {
    let html = state.views.render(page, model)?;
    Ok(http::build_html_response(html, ctx.is_head))
}

async fn store_image(
    state: &AppState,
    image: Option<&UploadedFile>,
) -> Result<Option<String>, AppError> {
    match image {
        Some(file) => Ok(Some(state.uploads.store(file).await?)),
        None => Ok(None),
    }
}

/// Remove the image stored for a write the repository then rejected
async fn discard_on_error<T>(
    state: &AppState,
    result: Result<T, ArticleError>,
    image_url: Option<&str>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            if let Some(url) = image_url {
                state.uploads.discard(url).await;
            }
            Err(err.into())
        }
    }
}

fn redirect_with_flash(
    state: &AppState,
    ctx: &RequestContext<'_>,
    target: &str,
    message: &str,
) -> Response<Full<Bytes>> {
    let id = state
        .sessions
        .set_success(ctx.session_id.as_deref(), message);
    let cookie = session::build_session_cookie(
        &state.config.session.cookie_name,
        &id,
        state.sessions.max_age(),
    );
    http::build_redirect_response(target, Some(&cookie))
}
