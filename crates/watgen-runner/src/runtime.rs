//! Loading a compiled binary into the `wasmi` runtime.
//!
//! [`Runtime::load`] reads the binary, validates it with `wasmparser`,
//! links the host functions in an [`ImportTable`] and instantiates it.
//! The resulting [`LoadedModule`] exposes the instance exports as they are;
//! nothing is wrapped or renamed.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use sha2::{Digest, Sha256};
use wasmi::{Engine, Func, Instance, IntoFunc, Linker, Module, Store, TypedFunc, WasmParams, WasmResults};

use crate::error::{HandoffError, HandoffResult};

type HostFactory = Box<dyn FnOnce(&mut Store<()>) -> Func>;

// ══════════════════════════════════════════════════════════════════════════════
// ImportTable
// ══════════════════════════════════════════════════════════════════════════════

/// Host functions to satisfy a module's imports, keyed by
/// `module → name`.
#[derive(Default)]
pub struct ImportTable {
    entries: BTreeMap<(String, String), HostFactory>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide `module.name` as the host closure `f`.
    ///
    /// Registering the same pair again replaces the earlier function.
    pub fn func<P, R, F>(mut self, module: &str, name: &str, f: F) -> Self
    where
        F: IntoFunc<(), P, R> + 'static,
        P: 'static,
        R: 'static,
    {
        self.entries.insert(
            (module.to_string(), name.to_string()),
            Box::new(move |store: &mut Store<()>| Func::wrap(store, f)),
        );
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn link(self, store: &mut Store<()>, linker: &mut Linker<()>) -> HandoffResult<()> {
        for ((module, name), factory) in self.entries {
            let func = factory(store);
            linker
                .define(&module, &name, func)
                .map_err(wasmi::Error::from)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ImportTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.keys().map(|(m, n)| format!("{m}.{n}")))
            .finish()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Runtime
// ══════════════════════════════════════════════════════════════════════════════

/// Owns the `wasmi` engine modules are compiled with.
#[derive(Debug, Default)]
pub struct Runtime {
    engine: Engine,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the binary at `path` and instantiate it.
    pub fn load(&self, path: &Path, imports: ImportTable) -> HandoffResult<LoadedModule> {
        tracing::info!(stage = "load", path = %path.display());
        let bytes = std::fs::read(path).map_err(|source| HandoffError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        wasmparser::validate(&bytes).map_err(|e| HandoffError::Invalid {
            path: path.to_path_buf(),
            message: format!("{e}"),
        })?;
        self.instantiate(bytes, imports)
    }

    /// Instantiate an already-validated binary and run its start function.
    pub fn instantiate(&self, bytes: Vec<u8>, imports: ImportTable) -> HandoffResult<LoadedModule> {
        tracing::info!(stage = "instantiate", bytes = bytes.len(), imports = imports.len());
        let module = Module::new(&self.engine, &bytes[..])?;
        let mut store = Store::new(&self.engine, ());
        let mut linker = Linker::<()>::new(&self.engine);
        imports.link(&mut store, &mut linker)?;
        let instance = linker.instantiate(&mut store, &module)?.start(&mut store)?;
        Ok(LoadedModule {
            store,
            instance,
            bytes,
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// LoadedModule
// ══════════════════════════════════════════════════════════════════════════════

/// An instantiated module and the store it lives in.
pub struct LoadedModule {
    store: Store<()>,
    instance: Instance,
    bytes: Vec<u8>,
}

impl LoadedModule {
    pub fn instance(&self) -> Instance {
        self.instance
    }

    pub fn store(&self) -> &Store<()> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<()> {
        &mut self.store
    }

    /// Names of every export.
    pub fn exports(&self) -> Vec<String> {
        self.instance
            .exports(&self.store)
            .map(|export| export.name().to_string())
            .collect()
    }

    /// Look up an exported function with a static signature.
    pub fn typed_func<P, R>(&self, name: &str) -> HandoffResult<TypedFunc<P, R>>
    where
        P: WasmParams,
        R: WasmResults,
    {
        Ok(self.instance.get_typed_func::<P, R>(&self.store, name)?)
    }

    /// Call an exported function.
    pub fn call<P, R>(&mut self, name: &str, params: P) -> HandoffResult<R>
    where
        P: WasmParams,
        R: WasmResults,
    {
        let func = self.typed_func::<P, R>(name)?;
        Ok(func.call(&mut self.store, params)?)
    }

    /// Contents of the exported `memory`, if there is one.
    pub fn memory(&self) -> Option<&[u8]> {
        self.instance
            .get_memory(&self.store, "memory")
            .map(|memory| memory.data(&self.store))
    }

    /// Lowercase hex SHA-256 of the loaded binary.
    pub fn digest(&self) -> String {
        Sha256::digest(&self.bytes)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("bytes", &self.bytes.len())
            .field("exports", &self.exports())
            .finish()
    }
}
