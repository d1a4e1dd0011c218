// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Name tags: the text fields shown at the corner of each rectangle.
//!
//! Tags are pooled and reused across frames. A freed tag is hidden and
//! emptied, a reused one is shown again.

use annoview::engine::pool::ResourcePool;
use annoview::engine::store::NameLabel;
use annoview::models::annotation::Rectangle;

#[derive(Debug, Clone, PartialEq)]
pub struct NameTag {
    pub id: usize,
    /// Edit buffer while naming, the committed name afterwards.
    pub text: String,
    pub visible: bool,
    /// Palette colour of the rectangle the tag belongs to.
    pub color: [u8; 3],
    /// Grab keyboard focus on the next frame.
    pub wants_focus: bool,
}

impl NameTag {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            text: String::new(),
            visible: true,
            color: [255, 255, 255],
            wants_focus: false,
        }
    }
}

impl NameLabel for NameTag {
    fn attach(&mut self, rect: &Rectangle) {
        self.text = rect.name.clone().unwrap_or_default();
        self.color = rect.color();
        self.wants_focus = rect.name.is_none();
    }
}

/// Pool of name tags with hide-on-free and show-on-reuse hooks.
pub fn name_tag_pool() -> ResourcePool<NameTag> {
    ResourcePool::new(
        NameTag::new,
        |tag: &mut NameTag| {
            tag.visible = false;
            tag.text.clear();
            tag.wants_focus = false;
        },
        |tag: &mut NameTag| tag.visible = true,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use annoview::util::geometry::Point;

    #[test]
    fn test_attach_focuses_unnamed_rectangles() {
        let mut tag = NameTag::new(0);
        let mut rect = Rectangle::from_corners(Point::new(1.0, 2.0), Point::new(9.0, 9.0));
        tag.attach(&rect);
        assert!(tag.wants_focus);
        assert_eq!(tag.text, "");
        assert_eq!(tag.color, rect.color());

        rect.name = Some("dog".to_string());
        tag.attach(&rect);
        assert!(!tag.wants_focus);
        assert_eq!(tag.text, "dog");
    }

    #[test]
    fn test_pool_hides_and_shows_tags() {
        let mut pool = name_tag_pool();
        let (id, tag) = pool.acquire();
        tag.text.push_str("draft");
        pool.release(id);

        let (again, tag) = pool.acquire();
        assert_eq!(again, id);
        assert!(tag.visible);
        assert!(tag.text.is_empty());
    }
}
