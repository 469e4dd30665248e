use super::{ElementId, ElementSnapshot, Selector, Viewport};
use crate::error::{RegionError, Result};
use parking_lot::RwLock;
use std::sync::Arc;

/// Наблюдаемая иерархия элементов.
///
/// Responsibilities (strict):
/// - Enumerate elements (whole subtree or by selector) in document order.
/// - Provide a snapshot of an element's style and logical bounds.
/// - Report `ElementStale` when an element disappeared between enumeration and read.
/// - Do NOT decide which elements are interactive; that belongs to the classifier.
pub trait ElementTree: Send + Sync {
    fn root(&self) -> ElementId;

    /// Все потомки `root` (без самого `root`) в порядке документа
    fn descendants(&self, root: ElementId) -> Vec<ElementId>;

    fn snapshot(&self, id: ElementId) -> Result<ElementSnapshot>;

    fn viewport(&self) -> Viewport;

    fn device_pixel_ratio(&self) -> f64;

    /// Элементы, совпадающие с селектором. Исчезнувшие элементы пропускаются.
    fn select(&self, selector: &Selector) -> Vec<ElementId> {
        let root = self.root();
        std::iter::once(root)
            .chain(self.descendants(root))
            .filter(|id| {
                self.snapshot(*id)
                    .map(|el| selector.matches(&el))
                    .unwrap_or(false)
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Node {
    snapshot: ElementSnapshot,
    children: Vec<ElementId>,
}

/// Сцена в памяти: плоская арена узлов, индекс в арене совпадает с `ElementId`.
/// Удалённые узлы остаются пустыми слотами, чтобы старые идентификаторы
/// честно отвечали `ElementStale`.
#[derive(Debug, Clone)]
pub struct SceneTree {
    nodes: Vec<Option<Node>>,
    viewport: Viewport,
    device_pixel_ratio: f64,
}

impl SceneTree {
    /// Пустая сцена с единственным корневым элементом `body`
    pub fn new(viewport: Viewport, device_pixel_ratio: f64) -> Self {
        let root = Node {
            snapshot: ElementSnapshot::new(ElementId(0), "body"),
            children: Vec::new(),
        };
        Self {
            nodes: vec![Some(root)],
            viewport,
            device_pixel_ratio,
        }
    }

    /// Добавить элемент; `snapshot.id` перезаписывается выданным идентификатором
    pub fn insert(&mut self, parent: ElementId, mut snapshot: ElementSnapshot) -> Result<ElementId> {
        let id = ElementId(self.nodes.len() as u32);
        let parent_node = self
            .node_mut(parent)
            .ok_or(RegionError::ElementStale(parent))?;
        parent_node.children.push(id);

        snapshot.id = id;
        self.nodes.push(Some(Node {
            snapshot,
            children: Vec::new(),
        }));
        Ok(id)
    }

    /// Удалить элемент вместе с поддеревом. Корень удалить нельзя.
    pub fn remove(&mut self, id: ElementId) -> Result<()> {
        if id == self.root() {
            return RegionError::config("корневой элемент сцены нельзя удалить");
        }
        if self.node(id).is_none() {
            return Err(RegionError::ElementStale(id));
        }

        for node in self.nodes.iter_mut().flatten() {
            node.children.retain(|child| *child != id);
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0 as usize).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    /// Изменить снимок элемента на месте (стиль, геометрия, классы)
    pub fn update<F>(&mut self, id: ElementId, f: F) -> Result<()>
    where
        F: FnOnce(&mut ElementSnapshot),
    {
        let node = self.node_mut(id).ok_or(RegionError::ElementStale(id))?;
        f(&mut node.snapshot);
        node.snapshot.id = id;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }
}

impl ElementTree for SceneTree {
    fn root(&self) -> ElementId {
        ElementId(0)
    }

    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let Some(node) = self.node(root) else {
            return out;
        };

        // Обход в глубину в порядке документа
        let mut stack: Vec<ElementId> = node.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn snapshot(&self, id: ElementId) -> Result<ElementSnapshot> {
        self.node(id)
            .map(|node| node.snapshot.clone())
            .ok_or(RegionError::ElementStale(id))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }
}

/// Разделяемая сцена: читается движком синхронизации, подменяется наблюдателем файла
#[derive(Debug, Clone)]
pub struct SharedScene {
    inner: Arc<RwLock<SceneTree>>,
}

impl SharedScene {
    pub fn new(tree: SceneTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Заменить сцену целиком, вернуть предыдущую
    pub fn replace(&self, tree: SceneTree) -> SceneTree {
        std::mem::replace(&mut *self.inner.write(), tree)
    }

    pub fn modify<R>(&self, f: impl FnOnce(&mut SceneTree) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl ElementTree for SharedScene {
    fn root(&self) -> ElementId {
        self.inner.read().root()
    }

    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        self.inner.read().descendants(root)
    }

    fn snapshot(&self, id: ElementId) -> Result<ElementSnapshot> {
        self.inner.read().snapshot(id)
    }

    fn viewport(&self) -> Viewport {
        self.inner.read().viewport()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.inner.read().device_pixel_ratio()
    }

    fn select(&self, selector: &Selector) -> Vec<ElementId> {
        self.inner.read().select(selector)
    }
}
