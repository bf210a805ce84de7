//! Template tree walker.

use crate::error::{GeneratorError, RenderError};
use crate::manager::ContextManager;
use crate::renderer::ValueRenderer;
use indexmap::IndexMap;
use mimeo_core::{special_field_name, Atom, Body, Element, Model, Node, ObjectNode, Template};
use mimeo_data::Datasets;
use tracing::debug;

/// Produces records from templates.
///
/// All generation state lives in the [`ContextManager`] passed to
/// [`Generator::generate`]; the generator itself only holds the renderer.
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    renderer: ValueRenderer,
}

impl Generator {
    /// Create a generator over the process-wide reference datasets.
    pub fn new() -> Result<Self, GeneratorError> {
        Ok(Self::with_datasets(mimeo_data::datasets()?))
    }

    pub fn with_datasets(datasets: &'static Datasets) -> Self {
        Self {
            renderer: ValueRenderer::new(datasets),
        }
    }

    /// Lazily generate `count` records per template, in template order.
    ///
    /// `manager` must have an open session. Each record is rendered when the
    /// iterator is advanced; the iterator ends after the first error.
    pub fn generate<'a>(
        &'a self,
        templates: &'a [Template],
        manager: &'a mut ContextManager,
    ) -> Records<'a> {
        Records {
            generator: self,
            templates,
            manager,
            template_index: 0,
            produced: 0,
            failed: false,
        }
    }

    fn render_record(
        &self,
        manager: &mut ContextManager,
        template: &Template,
    ) -> Result<Element, GeneratorError> {
        let model = &template.model;
        manager.context_switch(model.context_name(), |m| {
            m.next_iteration()?;
            self.render_model(m, model)
        })
    }

    /// Expand a nested template group. Its contexts restart iteration
    /// numbering on every expansion. A group nested in a record of its own
    /// context sets the enclosing iterations aside and restores them after.
    fn generate_nested(
        &self,
        manager: &mut ContextManager,
        templates: &[Template],
    ) -> Result<Vec<Element>, GeneratorError> {
        let mut records = Vec::new();
        for template in templates {
            let model = &template.model;
            let enclosing = manager.is_active(model.context_name());
            debug!(
                context = model.context_name(),
                count = template.count,
                enclosing,
                "Expanding nested template"
            );
            manager.context_switch(model.context_name(), |m| {
                if !enclosing {
                    m.current_context_mut()?.clear_iterations();
                    return self.render_group(m, template, &mut records);
                }

                let saved = m.current_context_mut()?.take_iterations();
                let result = self.render_group(m, template, &mut records);
                m.current_context_mut()?.restore_iterations(saved);
                result
            })?;
        }
        Ok(records)
    }

    fn render_group(
        &self,
        manager: &mut ContextManager,
        template: &Template,
        records: &mut Vec<Element>,
    ) -> Result<(), GeneratorError> {
        for _ in 0..template.count {
            manager.next_iteration()?;
            records.push(self.render_model(manager, &template.model)?);
        }
        Ok(())
    }

    /// Render a model. Model-level attributes come first on the root,
    /// ahead of its inline `_attrs`.
    fn render_model(&self, manager: &mut ContextManager, model: &Model) -> Result<Element, GeneratorError> {
        let mut root = self.render_node(manager, &model.root_tag, &model.root)?;

        let mut attributes = IndexMap::with_capacity(model.attributes.len() + root.attributes.len());
        for (name, value) in &model.attributes {
            let value = self
                .renderer
                .render(manager, &Node::Atom(value.clone()))
                .map_err(|source| render_error(name, source))?;
            attributes.insert(name.clone(), value);
        }
        for (name, value) in std::mem::take(&mut root.attributes) {
            attributes.entry(name).or_insert(value);
        }
        root.attributes = attributes;
        Ok(root)
    }

    fn render_node(
        &self,
        manager: &mut ContextManager,
        tag: &str,
        node: &Node,
    ) -> Result<Element, GeneratorError> {
        let (tag, special) = match special_field_name(tag) {
            Some(name) => (name, true),
            None => (tag, false),
        };

        match node {
            Node::Atom(_) | Node::Util(_) => {
                let value = self.render_leaf(manager, tag, node, special)?;
                Ok(Element::with_value(tag, value))
            }
            Node::Object(object) => {
                if let Some(value) = &object.value {
                    let value = self.render_leaf(manager, tag, value, special)?;
                    let mut element = Element::with_value(tag, value);
                    element.attributes = self.render_attributes(manager, object)?;
                    return Ok(element);
                }
                self.check_complex(manager, tag, special)?;
                self.render_object(manager, tag, object)
            }
            Node::Array(items) => {
                self.check_complex(manager, tag, special)?;
                self.render_array(manager, tag, items)
            }
            Node::Templates(templates) => {
                self.check_complex(manager, tag, special)?;
                let records = self.generate_nested(manager, templates)?;
                Ok(Element::with_body(tag, Body::List(records)))
            }
        }
    }

    /// Render an atomic value, store it as a special field when flagged and
    /// feed the reference cache.
    fn render_leaf(
        &self,
        manager: &mut ContextManager,
        tag: &str,
        node: &Node,
        special: bool,
    ) -> Result<Atom, GeneratorError> {
        let value = self
            .renderer
            .render(manager, node)
            .map_err(|source| render_error(tag, source))?;
        if special {
            manager
                .curr_iteration_mut()?
                .add_special_field(tag, value.clone())?;
        }
        manager.cache_ref(tag, &value)?;
        Ok(value)
    }

    fn check_complex(&self, manager: &ContextManager, tag: &str, special: bool) -> Result<(), GeneratorError> {
        if special {
            return Err(GeneratorError::InvalidSpecialField(tag.to_string()));
        }
        if manager.is_referenced(tag)? {
            let context = manager
                .get_current_context()?
                .map(|context| context.name().to_string())
                .unwrap_or_default();
            return Err(render_error(
                tag,
                RenderError::InvalidReferenceValue {
                    context,
                    field: tag.to_string(),
                },
            ));
        }
        Ok(())
    }

    fn render_attributes(
        &self,
        manager: &mut ContextManager,
        object: &ObjectNode,
    ) -> Result<IndexMap<String, Atom>, GeneratorError> {
        object
            .attributes
            .iter()
            .map(|(name, node)| {
                let value = self
                    .renderer
                    .render(manager, node)
                    .map_err(|source| render_error(name, source))?;
                Ok::<_, GeneratorError>((name.clone(), value))
            })
            .collect()
    }

    fn render_object(
        &self,
        manager: &mut ContextManager,
        tag: &str,
        object: &ObjectNode,
    ) -> Result<Element, GeneratorError> {
        let attributes = self.render_attributes(manager, object)?;
        let children = object
            .fields
            .iter()
            .map(|(child_tag, child)| self.render_node(manager, child_tag, child))
            .collect::<Result<Vec<_>, _>>()?;

        let mut element = Element::with_body(tag, Body::Children(children));
        element.attributes = attributes;
        Ok(element)
    }

    fn render_array(
        &self,
        manager: &mut ContextManager,
        tag: &str,
        items: &[Node],
    ) -> Result<Element, GeneratorError> {
        if items.iter().all(Node::is_atomic) {
            let values = items
                .iter()
                .map(|item| self.render_leaf(manager, tag, item, false))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Element::with_body(tag, Body::Values(values)));
        }

        let mut children = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Node::Atom(_) | Node::Util(_) => {
                    let value = self.render_leaf(manager, tag, item, false)?;
                    children.push(Element::with_value(tag, value));
                }
                Node::Object(object) if object.value.is_none() && object.attributes.is_empty() => {
                    let Some((child_tag, child)) = object.fields.first() else {
                        return Err(unsupported(tag, "list items must not be empty objects"));
                    };
                    if object.fields.len() > 1 {
                        return Err(unsupported(tag, "list items must have exactly one field"));
                    }
                    children.push(self.render_node(manager, child_tag, child)?);
                }
                Node::Object(_) => {
                    return Err(unsupported(tag, "list items cannot carry attributes or a value"));
                }
                Node::Templates(templates) => {
                    children.extend(self.generate_nested(manager, templates)?);
                }
                Node::Array(_) => return Err(unsupported(tag, "nested lists are not supported")),
            }
        }
        Ok(Element::with_body(tag, Body::List(children)))
    }
}

fn render_error(tag: &str, source: RenderError) -> GeneratorError {
    GeneratorError::Render {
        tag: tag.to_string(),
        source,
    }
}

fn unsupported(tag: &str, reason: &str) -> GeneratorError {
    GeneratorError::UnsupportedArrayItem {
        tag: tag.to_string(),
        reason: reason.to_string(),
    }
}

/// Iterator that lazily renders records.
pub struct Records<'a> {
    generator: &'a Generator,
    templates: &'a [Template],
    manager: &'a mut ContextManager,
    template_index: usize,
    produced: u64,
    failed: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<Element, GeneratorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let templates = self.templates;
        loop {
            let template = templates.get(self.template_index)?;
            if self.produced < template.count {
                self.produced += 1;
                let record = self.generator.render_record(self.manager, template);
                self.failed = record.is_err();
                return Some(record);
            }
            self.template_index += 1;
            self.produced = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self
            .templates
            .iter()
            .skip(self.template_index)
            .fold(0u64, |total, template| total.saturating_add(template.count))
            .saturating_sub(self.produced);
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (0, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;
    use mimeo_core::MimeoConfig;

    fn generate_all(json: &str) -> Result<Vec<Element>, GeneratorError> {
        let config = MimeoConfig::from_json(json).unwrap();
        let generator = Generator::new().unwrap();
        let mut manager = ContextManager::from_config(&config);
        let mut session = manager.start_session();
        let records = generator.generate(&config.templates, &mut session).collect();
        records
    }

    fn text(element: &Element, tag: &str) -> String {
        element.child(tag).and_then(Element::value).unwrap().to_text()
    }

    #[test]
    fn test_auto_increment_per_record() {
        let records = generate_all(
            r#"{"_templates_": [{"count": 3, "model": {"Item": {"Id": "{auto_increment}"}}}]}"#,
        )
        .unwrap();

        let ids: Vec<String> = records.iter().map(|r| text(r, "Id")).collect();
        assert_eq!(ids, vec!["00001", "00002", "00003"]);
        assert!(records.iter().all(|r| r.tag == "Item"));
    }

    #[test]
    fn test_special_field_echo() {
        let records = generate_all(
            r#"{"_templates_": [{"count": 2, "model": {"Item": {
                "{:Tag:}": "{random_str}",
                "Name": "{:Tag:}value",
                "Echo": "{:Tag:}"
            }}}]}"#,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        for record in &records {
            let tag = text(record, "Tag");
            assert_eq!(text(record, "Echo"), tag);
            assert_eq!(text(record, "Name"), format!("{tag}value"));
        }
        assert_ne!(text(&records[0], "Tag"), text(&records[1], "Tag"));
    }

    #[test]
    fn test_nested_iterations_restart() {
        let records = generate_all(
            r#"{"_templates_": [{"count": 2, "model": {"Parent": {
                "Id": "{curr_iter}",
                "Children": {"_templates_": [
                    {"count": 3, "model": {"Child": {"Iter": "{curr_iter}", "ParentIter": {"_mimeo_util": {"_name": "curr_iter", "context": "Parent"}}}}}
                ]}
            }}}]}"#,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        let mut sequence = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            let children = record.child("Children").unwrap().children();
            assert_eq!(children.len(), 3);
            for child in children {
                assert_eq!(child.tag, "Child");
                sequence.push(text(child, "Iter"));
                assert_eq!(text(child, "ParentIter"), (idx + 1).to_string());
            }
        }
        assert_eq!(sequence, vec!["1", "2", "3", "1", "2", "3"]);
    }

    #[test]
    fn test_self_nested_context_keeps_outer_iteration() {
        let records = generate_all(
            r#"{"_templates_": [{"count": 3, "model": {"Category": {
                "Before": "{curr_iter}",
                "{:Mark:}": "{curr_iter}",
                "KeyBefore": "{key}",
                "Sub": {"_templates_": [
                    {"count": 2, "model": {"Category": {"Inner": "{curr_iter}", "{:Mark:}": "inner"}}}
                ]},
                "After": "{curr_iter}",
                "MarkAfter": "{:Mark:}",
                "KeyAfter": "{key}"
            }}}]}"#,
        )
        .unwrap();

        assert_eq!(records.len(), 3);
        for (idx, record) in records.iter().enumerate() {
            let expected = (idx + 1).to_string();
            assert_eq!(text(record, "Before"), expected);
            assert_eq!(text(record, "After"), expected);
            assert_eq!(text(record, "Mark"), expected);
            assert_eq!(text(record, "MarkAfter"), expected);
            assert_eq!(text(record, "KeyBefore"), text(record, "KeyAfter"));

            let inner: Vec<String> = record
                .child("Sub")
                .unwrap()
                .children()
                .iter()
                .map(|child| text(child, "Inner"))
                .collect();
            assert_eq!(inner, vec!["1", "2"]);
        }
    }

    #[test]
    fn test_model_attributes_precede_inline_attributes() {
        let records = generate_all(
            r#"{"_templates_": [{"count": 1, "model": {
                "Product": {"_attrs": {"sku": "A1"}, "Name": "Widget"},
                "attributes": {"xmlns": "urn:shop"}
            }}]}"#,
        )
        .unwrap();

        let names: Vec<&str> = records[0].attributes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["xmlns", "sku"]);
    }

    #[test]
    fn test_size_hint_saturates() {
        let config = MimeoConfig::from_json(&format!(
            r#"{{"_templates_": [
                {{"count": {max}, "model": {{"A": 1}}}},
                {{"count": {max}, "model": {{"B": 1}}}}
            ]}}"#,
            max = u64::MAX
        ))
        .unwrap();
        let generator = Generator::new().unwrap();
        let mut manager = ContextManager::from_config(&config);
        let mut session = manager.start_session();
        let records = generator.generate(&config.templates, &mut session);

        let (lower, upper) = records.size_hint();
        assert_eq!(lower, 0);
        assert_eq!(upper, Some(usize::try_from(u64::MAX).unwrap_or(usize::MAX)));
    }

    #[test]
    fn test_attributes_and_values() {
        let records = generate_all(
            r#"{"_templates_": [{"count": 1, "model": {
                "Book": {
                    "_attrs": {"lang": "en"},
                    "Title": {"_attrs": {"format": "short"}, "_value": "Dune"}
                },
                "attributes": {"xmlns": "urn:books"}
            }}]}"#,
        )
        .unwrap();

        let book = &records[0];
        assert_eq!(book.attributes.get("xmlns"), Some(&Atom::from("urn:books")));
        assert_eq!(book.attributes.get("lang"), Some(&Atom::from("en")));

        let title = book.child("Title").unwrap();
        assert_eq!(title.value(), Some(&Atom::from("Dune")));
        assert_eq!(title.attributes.get("format"), Some(&Atom::from("short")));
    }

    #[test]
    fn test_arrays() {
        let records = generate_all(
            r#"{"_templates_": [{"count": 1, "model": {"Item": {
                "Tag": ["a", "{auto_increment}", true],
                "Mixed": [{"One": 1}, {"Two": {"Deep": "x"}}, "plain"]
            }}}]}"#,
        )
        .unwrap();

        let item = &records[0];
        assert_eq!(
            item.child("Tag").unwrap().values(),
            &[Atom::from("a"), Atom::from("00001"), Atom::Bool(true)]
        );

        let mixed = item.child("Mixed").unwrap();
        let tags: Vec<&str> = mixed.children().iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["One", "Two", "Mixed"]);
        assert_eq!(text(mixed.child("Two").unwrap(), "Deep"), "x");
    }

    #[test]
    fn test_nested_list_is_unsupported() {
        let result = generate_all(
            r#"{"_templates_": [{"count": 1, "model": {"Item": {"Bad": [["a"], {"B": 1}]}}}]}"#,
        );
        assert!(matches!(result, Err(GeneratorError::UnsupportedArrayItem { .. })));
    }

    #[test]
    fn test_complex_special_field() {
        let result = generate_all(
            r#"{"_templates_": [{"count": 1, "model": {"Item": {"{:Tag:}": {"A": 1}}}}]}"#,
        );
        assert!(matches!(result, Err(GeneratorError::InvalidSpecialField(tag)) if tag == "Tag"));
    }

    #[test]
    fn test_references_between_templates() {
        let records = generate_all(
            r#"{
                "refs": {"OWNER": {"context": "Owner", "field": "Id", "type": "parallel"}},
                "_templates_": [
                    {"count": 2, "model": {"Owner": {"Id": "{auto_increment}"}}},
                    {"count": 2, "model": {"Pet": {"OwnerId": "{OWNER}"}}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(text(&records[2], "OwnerId"), "00001");
        assert_eq!(text(&records[3], "OwnerId"), "00002");
    }

    #[test]
    fn test_complex_referenced_field() {
        let result = generate_all(
            r#"{
                "refs": {"OWNER": {"context": "Owner", "field": "Id"}},
                "_templates_": [{"count": 1, "model": {"Owner": {"Id": {"A": 1}}}}]
            }"#,
        );
        assert!(matches!(
            result,
            Err(GeneratorError::Render {
                source: RenderError::InvalidReferenceValue { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_generation_is_lazy() {
        let config = MimeoConfig::from_json(
            r#"{"_templates_": [
                {"count": 2, "model": {"Ok": {"Id": "{auto_increment}"}}},
                {"count": 2, "model": {"Bad": {"Id": "{MISSING}"}}}
            ]}"#,
        )
        .unwrap();
        let generator = Generator::new().unwrap();
        let mut manager = ContextManager::from_config(&config);
        let mut session = manager.start_session();

        let mut records = generator.generate(&config.templates, &mut session);
        assert!(records.next().unwrap().is_ok());
        assert!(records.next().unwrap().is_ok());
        assert!(matches!(
            records.next(),
            Some(Err(GeneratorError::Render {
                source: RenderError::VarNotFound(_),
                ..
            }))
        ));
        assert!(records.next().is_none());
    }

    #[test]
    fn test_session_released_after_error() {
        let config = MimeoConfig::from_json(
            r#"{"_templates_": [{"count": 3, "model": {"A": {"V": "{:Missing:}"}}}]}"#,
        )
        .unwrap();
        let generator = Generator::new().unwrap();
        let mut manager = ContextManager::from_config(&config);

        let result: Result<Vec<Element>, GeneratorError> = (|| {
            let mut session = manager.start_session();
            let records = generator.generate(&config.templates, &mut session).collect();
            records
        })();
        assert!(result.is_err());

        assert!(!manager.is_alive());
        assert!(matches!(manager.get_context("A"), Err(ContextError::NotAlive)));
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let json = r#"{"seed": 42, "_templates_": [{"count": 5, "model": {"P": {
            "Name": "{first_name}",
            "City": {"_mimeo_util": {"_name": "city", "unique": false}},
            "Code": "{random_str}"
        }}}]}"#;
        assert_eq!(generate_all(json).unwrap(), generate_all(json).unwrap());
    }

    #[test]
    fn test_root_special_field_context() {
        let records = generate_all(
            r#"{"_templates_": [{"count": 2, "model": {"{:Item:}": "{auto_increment}"}}]}"#,
        )
        .unwrap();

        assert_eq!(records[0].tag, "Item");
        assert_eq!(records[1].value(), Some(&Atom::from("00002")));
    }
}
