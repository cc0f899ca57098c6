use pdf_writer::Ref;
use std::collections::HashMap;

/// Every indirect object the document writer emits, keyed by role so that
/// objects can refer to each other before being written.
#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub enum RefType {
    Catalog,
    Info,
    PageTree,
    Page(usize),
    ContentForPage(usize),
    Font(usize),
    CidFont(usize),
    FontDescriptor(usize),
    FontData(usize),
    ToUnicode(usize),
    Image(usize),
    ImageMask(usize),
}

/// Allocates and remembers object references during a single document write.
pub struct ObjectReferences {
    refs: HashMap<RefType, Ref>,
    next_id: i32,
}

impl ObjectReferences {
    pub fn new() -> ObjectReferences {
        ObjectReferences {
            refs: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn get(&self, ref_type: RefType) -> Option<Ref> {
        self.refs.get(&ref_type).copied()
    }

    /// Allocate a fresh reference for the given role, replacing any
    /// previously allocated reference for the same role.
    pub fn gen(&mut self, ref_type: RefType) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        self.refs.insert(ref_type, id);
        id
    }
}
