use libc::c_void;

/// A `dlopen` handle. Only ever passed back to `dlsym`/`dlclose`.
#[derive(Debug)]
pub struct MutPointer(pub *mut c_void);

impl MutPointer {
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn as_mut_ptr(&self) -> *mut c_void {
        self.0
    }
}

unsafe impl Send for MutPointer {}
unsafe impl Sync for MutPointer {}
