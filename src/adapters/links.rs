use crate::domain::ports::LinkLister;
use crate::utils::error::{MenuError, Result};
use regex::Regex;

/// Lists the `<a href>` anchors of an HTML page whose visible text starts with
/// a given word (`"semaine"` on the canteen website).
#[derive(Debug, Clone)]
pub struct AnchorLinkLister {
    anchor: Regex,
    tag: Regex,
    label_prefix: String,
}

impl AnchorLinkLister {
    pub fn new(label_prefix: &str) -> Result<Self> {
        let anchor = Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>(.*?)</a\s*>"#)
            .map_err(|e| MenuError::ConfigError {
                message: format!("Invalid anchor pattern: {}", e),
            })?;
        let tag = Regex::new(r"(?s)<[^>]*>").map_err(|e| MenuError::ConfigError {
            message: format!("Invalid tag pattern: {}", e),
        })?;

        Ok(Self {
            anchor,
            tag,
            label_prefix: label_prefix.trim().to_lowercase(),
        })
    }

    fn visible_text(&self, inner_html: &str) -> String {
        let text = self.tag.replace_all(inner_html, " ");
        decode_entities(&text)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl LinkLister for AnchorLinkLister {
    fn list_links(&self, document: &str) -> Result<Vec<(String, String)>> {
        let mut links = Vec::new();

        for caps in self.anchor.captures_iter(document) {
            let href = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| decode_entities(m.as_str().trim()))
                .unwrap_or_default();
            let label = self.visible_text(caps.get(3).map_or("", |m| m.as_str()));

            if !label.to_lowercase().starts_with(&self.label_prefix) {
                continue;
            }
            if href.is_empty() {
                tracing::warn!("Skipping menu link without target: {}", label);
                continue;
            }

            links.push((label, href));
        }

        tracing::debug!("Found {} menu links", links.len());
        Ok(links)
    }
}

/// Decodes the HTML entities found in menu labels and links.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                "eacute" => Some('é'),
                "egrave" => Some('è'),
                "ecirc" => Some('ê'),
                "agrave" => Some('à'),
                "ucirc" => Some('û'),
                "ccedil" => Some('ç'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<ul class="nav"><li><a href="/index.aspx">Accueil</a></li></ul>
<div class="ul-container"><ul>
  <li><a href="/Files/menu-1.csv" target="_blank">Semaine du 3 au 7 mars</a></li>
  <li><a class="doc" href='/Files/menu-2.csv?v=1&amp;lang=fr'>
        <span>Semaine du 10 au 14</span> mars</a></li>
  <li><a href="/Files/menu-3.csv">Semaine du 28 au 1 ao&ucirc;t</a></li>
  <li><a href="">Semaine du 4 au 8 août</a></li>
</ul></div>
</body></html>
"#;

    #[test]
    fn test_list_menu_links() {
        let lister = AnchorLinkLister::new("semaine").unwrap();
        let links = lister.list_links(PAGE).unwrap();

        assert_eq!(
            links,
            vec![
                ("Semaine du 3 au 7 mars".to_string(), "/Files/menu-1.csv".to_string()),
                (
                    "Semaine du 10 au 14 mars".to_string(),
                    "/Files/menu-2.csv?v=1&lang=fr".to_string()
                ),
                ("Semaine du 28 au 1 août".to_string(), "/Files/menu-3.csv".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_document() {
        let lister = AnchorLinkLister::new("semaine").unwrap();
        assert!(lister.list_links("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("f&eacute;vrier"), "février");
        assert_eq!(decode_entities("d&#233;cembre &#xE9;"), "décembre é");
        assert_eq!(decode_entities("A & B"), "A & B");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }
}
