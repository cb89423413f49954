#![forbid(unsafe_code)]

//! Host rendering contract.

/// Creates, rewrites, measures, and places the element behind a slot.
///
/// `create` corresponds to the item template and is called once per slot.
/// After the pool is full only `update` is called: the element is rewritten
/// in place and never replaced.
pub trait ItemRenderer<T> {
    /// Opaque rendered element owned by a slot.
    type Element;

    /// Render a fresh element for `item`.
    fn create(&mut self, item: &T) -> Self::Element;

    /// Rewrite an existing element's content to show `item`.
    fn update(&mut self, element: &mut Self::Element, item: &T);

    /// Post-layout height of the element.
    fn measure(&self, element: &Self::Element) -> f64;

    /// Write the element's vertical offset (transform) to the host.
    fn place(&mut self, element: &mut Self::Element, offset_y: f64) {
        let _ = (element, offset_y);
    }
}

impl<T, R: ItemRenderer<T> + ?Sized> ItemRenderer<T> for &mut R {
    type Element = R::Element;

    fn create(&mut self, item: &T) -> Self::Element {
        (**self).create(item)
    }

    fn update(&mut self, element: &mut Self::Element, item: &T) {
        (**self).update(element, item);
    }

    fn measure(&self, element: &Self::Element) -> f64 {
        (**self).measure(element)
    }

    fn place(&mut self, element: &mut Self::Element, offset_y: f64) {
        (**self).place(element, offset_y);
    }
}
