//! Page model and the renderer that projects activity onto it.

use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::config::ViewConfig;
use crate::domain::Activity;
use crate::monitor::ActivityObserver;

/// Errors raised while binding a view to a page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Invalid selector: {0:?}")]
    InvalidSelector(String),

    #[error("No element matches selector: {0}")]
    ElementNotFound(String),
}

/// Simple selector: `tag`, `.class` or `#id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    Class(String),
    Id(String),
}

impl Selector {
    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Self::Tag(tag) => element.tag.eq_ignore_ascii_case(tag),
            Self::Class(class) => element.has_class(class),
            Self::Id(id) => element.id.as_deref() == Some(id.as_str()),
        }
    }
}

impl FromStr for Selector {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (ctor, name): (fn(String) -> Selector, &str) = match raw.as_bytes().first() {
            Some(b'.') => (Selector::Class, &raw[1..]),
            Some(b'#') => (Selector::Id, &raw[1..]),
            _ => (Selector::Tag, raw),
        };

        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ViewError::InvalidSelector(s.to_string()));
        }

        Ok(ctor(name.to_string()))
    }
}

/// A node in the page tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    classes: Vec<String>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add `class` unless already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if let Some(ref id) = self.id {
            out.push_str(&format!(" id=\"{}\"", escape(id)));
        }
        if !self.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape(&self.classes.join(" "))));
        }
        out.push('>');
        out.push_str(&escape(&self.text));
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str(&format!("</{}>", self.tag));
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Position of an element as child indices from the root.
type Path = Vec<usize>;

/// A page: one root element and its descendants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    root: Element,
}

impl Page {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// The default page: a `.content` container holding an `h1` heading.
    pub fn greeting(message: &str) -> Self {
        Self::new(
            Element::new("div")
                .with_class("content")
                .with_child(Element::new("h1").with_text(message)),
        )
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// First element matching `selector`, in document order.
    pub fn query_selector(&self, selector: &Selector) -> Option<&Element> {
        self.find(selector).and_then(|path| self.get(&path))
    }

    fn find(&self, selector: &Selector) -> Option<Path> {
        fn walk(element: &Element, selector: &Selector, path: &mut Path) -> bool {
            if selector.matches(element) {
                return true;
            }
            for (index, child) in element.children.iter().enumerate() {
                path.push(index);
                if walk(child, selector, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        walk(&self.root, selector, &mut path).then_some(path)
    }

    fn get(&self, path: &[usize]) -> Option<&Element> {
        path.iter()
            .try_fold(&self.root, |element, &index| element.children.get(index))
    }

    fn get_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        path.iter()
            .try_fold(&mut self.root, |element, &index| {
                element.children.get_mut(index)
            })
    }

    /// Serialize the page to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.root.write_html(&mut out);
        out
    }
}

/// Renders activity onto designated page elements.
///
/// Elements are resolved once, when the view is built.
#[derive(Debug)]
pub struct PageView {
    page: Page,
    text_target: Path,
    class_targets: Vec<Path>,
    active_message: String,
    prompt_message: String,
    active_class: String,
    inactive_class: String,
}

impl PageView {
    /// Bind `config` to `page`, failing if any selector matches nothing.
    pub fn new(page: Page, config: &ViewConfig) -> Result<Self, ViewError> {
        let resolve = |raw: &str| -> Result<Path, ViewError> {
            let selector: Selector = raw.parse()?;
            page.find(&selector)
                .ok_or_else(|| ViewError::ElementNotFound(raw.to_string()))
        };

        let text_target = resolve(config.text_target.as_str())?;
        let class_targets = config
            .class_targets
            .iter()
            .map(|raw| resolve(raw.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            page,
            text_target,
            class_targets,
            active_message: config.active_message.clone(),
            prompt_message: config.prompt_message.clone(),
            active_class: config.active_class.clone(),
            inactive_class: config.inactive_class.clone(),
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Apply `activity` to the page. Rendering the same state twice leaves
    /// the page unchanged.
    pub fn render(&mut self, activity: Activity) {
        let (message, add, remove) = match activity {
            Activity::Active => (&self.active_message, &self.active_class, &self.inactive_class),
            Activity::Inactive => (&self.prompt_message, &self.inactive_class, &self.active_class),
        };

        if let Some(element) = self.page.get_mut(&self.text_target) {
            element.text.clone_from(message);
        }

        for path in &self.class_targets {
            if let Some(element) = self.page.get_mut(path) {
                element.remove_class(remove);
                element.add_class(add);
            }
        }

        debug!("Rendered {} view", activity);
    }
}

impl ActivityObserver for PageView {
    fn on_change(&mut self, activity: Activity) {
        self.render(activity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_view() -> PageView {
        let config = ViewConfig::default();
        PageView::new(Page::greeting(&config.active_message), &config).unwrap()
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!("h1".parse::<Selector>(), Ok(Selector::Tag("h1".to_string())));
        assert_eq!(".content".parse::<Selector>(), Ok(Selector::Class("content".to_string())));
        assert_eq!("#main".parse::<Selector>(), Ok(Selector::Id("main".to_string())));
        assert!(matches!(
            "div > h1".parse::<Selector>(),
            Err(ViewError::InvalidSelector(_))
        ));
        assert!(matches!(
            ".".parse::<Selector>(),
            Err(ViewError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_query_selector_document_order() {
        let page = Page::new(
            Element::new("main")
                .with_child(Element::new("p").with_text("first").with_class("note"))
                .with_child(
                    Element::new("section")
                        .with_id("s")
                        .with_child(Element::new("p").with_text("second")),
                ),
        );

        let p = page.query_selector(&"p".parse().unwrap()).unwrap();
        assert_eq!(p.text, "first");

        let section = page.query_selector(&"#s".parse().unwrap()).unwrap();
        assert_eq!(section.tag, "section");

        assert!(page.query_selector(&".missing".parse().unwrap()).is_none());
    }

    #[test]
    fn test_class_list_dedupes() {
        let mut element = Element::new("div").with_class("a");
        element.add_class("a");
        element.add_class("b");
        assert_eq!(element.classes(), ["a", "b"]);

        element.remove_class("a");
        assert_eq!(element.classes(), ["b"]);
    }

    #[test]
    fn test_html_output() {
        let page = Page::new(
            Element::new("div")
                .with_class("x")
                .with_child(Element::new("h1").with_text("a < b & \"c\"")),
        );
        assert_eq!(
            page.to_html(),
            "<div class=\"x\"><h1>a &lt; b &amp; &quot;c&quot;</h1></div>"
        );
    }

    #[test]
    fn test_html_output_with_id_and_nesting() {
        let page = Page::new(
            Element::new("main")
                .with_id("root")
                .with_child(Element::new("p").with_class("a").with_class("b").with_text("x"))
                .with_child(Element::new("span")),
        );
        assert_eq!(
            page.to_html(),
            "<main id=\"root\"><p class=\"a b\">x</p><span></span></main>"
        );
    }

    #[test]
    fn test_render_inactive_and_active() {
        let mut view = default_view();

        view.render(Activity::Inactive);
        assert_eq!(
            view.page().to_html(),
            "<div class=\"content inactive\"><h1 class=\"inactive\">Are you still here?</h1></div>"
        );

        view.render(Activity::Active);
        assert_eq!(
            view.page().to_html(),
            "<div class=\"content active\"><h1 class=\"active\">Ehila!</h1></div>"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut view = default_view();

        for activity in [Activity::Active, Activity::Inactive] {
            view.render(activity);
            let first = view.page().to_html();
            view.render(activity);
            view.render(activity);
            assert_eq!(view.page().to_html(), first);
        }
    }

    #[test]
    fn test_missing_element_fails_fast() {
        let config = ViewConfig {
            class_targets: vec!["h1".to_string(), ".sidebar".to_string()],
            ..ViewConfig::default()
        };

        let err = PageView::new(Page::greeting("hi"), &config).unwrap_err();
        assert_eq!(err, ViewError::ElementNotFound(".sidebar".to_string()));
    }

    #[test]
    fn test_invalid_text_target() {
        let config = ViewConfig {
            text_target: String::new(),
            ..ViewConfig::default()
        };

        assert!(matches!(
            PageView::new(Page::greeting("hi"), &config),
            Err(ViewError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_view_as_observer() {
        let mut view = default_view();
        view.on_change(Activity::Inactive);

        let h1 = view.page().query_selector(&Selector::Tag("h1".to_string())).unwrap();
        assert_eq!(h1.text, "Are you still here?");
        assert!(h1.has_class("inactive"));
        assert!(!h1.has_class("active"));
    }
}
