/// Generates the read/list/delete methods every entity client shares.
///
/// Actor failures are mapped to [`StoreError`](crate::error::StoreError)
/// tagged with `$label`.
#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $label:literal, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](
                    &self,
                    id: String,
                ) -> Result<Option<$entity>, $crate::error::StoreError> {
                    tracing::debug!("Sending request");
                    self.inner
                        .get(id)
                        .await
                        .map_err(|e| $crate::error::StoreError::from_framework($label, e))
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $entity_name_snake s>](
                    &self,
                ) -> Result<Vec<$entity>, $crate::error::StoreError> {
                    tracing::debug!("Sending request");
                    self.inner
                        .list()
                        .await
                        .map_err(|e| $crate::error::StoreError::from_framework($label, e))
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<delete_ $entity_name_snake>](
                    &self,
                    id: String,
                ) -> Result<(), $crate::error::StoreError> {
                    tracing::debug!("Sending request");
                    self.inner
                        .delete(id)
                        .await
                        .map_err(|e| $crate::error::StoreError::from_framework($label, e))
                }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $label:literal, $entity_name_snake:ident) => {
        $crate::impl_client_new!($client_name, $entity);
        $crate::impl_client_methods!($client_name, $entity, $label, $entity_name_snake);
    };
}
