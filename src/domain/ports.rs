/// The three libsodium entry points the probe calls.
pub trait SodiumApi {
    fn library_version_major(&self) -> i32;
    fn library_version_minor(&self) -> i32;
    fn init(&self) -> i32;
}

impl<T: SodiumApi + ?Sized> SodiumApi for &T {
    fn library_version_major(&self) -> i32 {
        (**self).library_version_major()
    }

    fn library_version_minor(&self) -> i32 {
        (**self).library_version_minor()
    }

    fn init(&self) -> i32 {
        (**self).init()
    }
}
