use regex::Regex;
use std::sync::OnceLock;

const FIT_STYLE: &str = "max-width: 100%; height: auto;";

fn root_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<svg\b(?P<attrs>[^>]*?)(?P<close>/?)>").expect("valid svg tag regex")
    })
}

fn attribute() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?P<name>[A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
            .expect("valid attribute regex")
    })
}

/// Make the root `<svg>` element scale to its container.
///
/// Fixed `width`/`height` attributes are dropped (turned into a `viewBox`
/// when none exists), and the element gets `width="100%"` plus a style that
/// caps it at the container width. Markup without an `<svg>` element is
/// returned unchanged.
pub fn normalize_svg(svg: &str) -> String {
    let Some(caps) = root_tag().captures(svg) else {
        return svg.to_string();
    };
    let Some(whole) = caps.get(0) else {
        return svg.to_string();
    };
    let attrs = caps.name("attrs").map_or("", |m| m.as_str());
    let self_closing = caps.name("close").is_some_and(|m| !m.as_str().is_empty());

    let mut kept = Vec::new();
    let mut width = None;
    let mut height = None;
    let mut style = None;
    let mut has_view_box = false;

    for attr in attribute().captures_iter(attrs) {
        let name = &attr["name"];
        let value = attr
            .name("dq")
            .or_else(|| attr.name("sq"))
            .map_or("", |m| m.as_str());
        match name.to_ascii_lowercase().as_str() {
            "width" => width = Some(value.to_string()),
            "height" => height = Some(value.to_string()),
            "style" => style = Some(value.to_string()),
            "viewbox" => {
                has_view_box = true;
                kept.push(format!("{name}=\"{value}\""));
            }
            _ => kept.push(format!("{name}=\"{value}\"")),
        }
    }

    if !has_view_box {
        if let (Some(w), Some(h)) = (
            width.as_deref().and_then(pixels),
            height.as_deref().and_then(pixels),
        ) {
            kept.push(format!("viewBox=\"0 0 {w} {h}\""));
        }
    }

    kept.push("width=\"100%\"".to_string());
    kept.push(format!("style=\"{}\"", merged_style(style.as_deref())));

    let mut tag = String::from("<svg ");
    tag.push_str(&kept.join(" "));
    tag.push_str(if self_closing { "/>" } else { ">" });

    let mut out = String::with_capacity(svg.len() + 64);
    out.push_str(&svg[..whole.start()]);
    out.push_str(&tag);
    out.push_str(&svg[whole.end()..]);
    out
}

/// Numeric length in user units; percentages and other units don't qualify.
fn pixels(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|n| *n > 0.0)?;
    Some(number)
}

fn merged_style(existing: Option<&str>) -> String {
    let mut style: String = existing
        .unwrap_or("")
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let property = decl
                .split_once(':')
                .map_or(*decl, |(prop, _)| prop)
                .trim()
                .to_ascii_lowercase();
            !matches!(property.as_str(), "width" | "height" | "max-width")
        })
        .map(|decl| format!("{decl}; "))
        .collect();
    style.push_str(FIT_STYLE);
    style
}
