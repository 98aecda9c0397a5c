//! JAX-RS client fragments. The request is built and sent in one chain on
//! `webTarget`, so there is no `given:` section.

use crate::emit::EmitBuffer;
use crate::model::{find_property, BodyValue};
use crate::{RenderError, RenderResult};

use super::http::{self, body_literal, present, property_literal};
use super::MethodContext;

pub fn when(ctx: &MethodContext<'_>) -> RenderResult<EmitBuffer> {
    let request = http::request(ctx)?;
    let response = http::response(ctx)?;
    let profile = &ctx.profile;
    if !request.multipart.is_empty() {
        return Err(RenderError::unsupported("multipart requests", "JAX-RS client"));
    }
    let url = http::url(request)?;
    let method = request.method.trim().to_ascii_uppercase();
    if method.is_empty() {
        return Err(RenderError::malformed("request method is not set"));
    }

    let mut links = vec![format!(".path({})", http::url_literal(profile, url))];
    for (name, value) in present(&url.query_parameters) {
        links.push(format!(
            ".queryParam({}, {})",
            profile.quoted(name),
            property_literal(profile, value)
        ));
    }
    let accept = find_property(&request.headers, "Accept").and_then(|h| h.value.test_side());
    links.push(match accept {
        Some(accept) => format!(".request({})", property_literal(profile, accept)),
        None => ".request()".to_string(),
    });
    for (name, value) in present(&request.headers) {
        if name.eq_ignore_ascii_case("Content-Type") || name.eq_ignore_ascii_case("Accept") {
            continue;
        }
        links.push(format!(
            ".header({}, {})",
            profile.quoted(name),
            property_literal(profile, value)
        ));
    }
    for (name, value) in present(&request.cookies) {
        links.push(format!(
            ".cookie({}, {})",
            profile.quoted(name),
            property_literal(profile, value)
        ));
    }
    links.push(match &request.body {
        Some(body) => {
            let content_type = ctx.metadata.input_content_type();
            let mime = match find_property(&request.headers, "Content-Type")
                .and_then(|h| h.value.test_side())
            {
                Some(BodyValue::Scalar(scalar)) => profile.quoted(&scalar.display()),
                _ => profile.quoted(http::mime_type(content_type)),
            };
            format!(
                ".build({}, entity({}, {}))",
                profile.quoted(&method),
                body_literal(ctx, body, content_type)?,
                mime
            )
        }
        None => format!(".build({})", profile.quoted(&method)),
    });
    links.push(".invoke()".to_string());

    let mut buffer = EmitBuffer::new();
    buffer.start_section("when:");
    buffer.chain("Response response = webTarget", &links);
    if reads_entity_as_string(response.body.as_ref()) {
        buffer.line_with_ending("String responseAsString = response.readEntity(String.class)");
    }
    buffer.close_block();
    Ok(buffer)
}

/// Byte bodies are read as `byte[]` by the body assertion itself.
fn reads_entity_as_string(body: Option<&BodyValue>) -> bool {
    match body {
        Some(BodyValue::FileRef(file)) => !file.is_byte(),
        Some(_) => true,
        None => false,
    }
}
