mod make_default_patch;

pub use make_default_patch::MakeDefaultPatch;
