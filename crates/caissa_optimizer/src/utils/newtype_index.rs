/// Dense 8-bit id newtype. The narrow width is a capacity invariant: the
/// production configuration never addresses more than 256 cities or teams.
#[macro_export]
macro_rules! define_id_newtype {
    ($name:ident, $t:ident) => {
        #[derive(
            serde::Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
        )]
        pub struct $name(u8);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl $name {
            pub const fn new(id: u8) -> Self {
                Self(id)
            }

            pub const fn get(&self) -> usize {
                self.0 as usize
            }
        }

        impl std::ops::Index<$name> for Vec<$t> {
            type Output = $t;
            fn index(&self, id: $name) -> &Self::Output {
                &self[id.0 as usize]
            }
        }

        impl std::ops::Index<$name> for [$t] {
            type Output = $t;
            fn index(&self, id: $name) -> &Self::Output {
                &self[id.0 as usize]
            }
        }
    };
}
