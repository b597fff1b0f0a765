use defmt::Format;
use embedded_storage_async::nor_flash::NorFlash;
use podium_pure::{io::ByteStore, layout::STORE_SIZE};
use sequential_storage::{
    cache::NoCache,
    map::{Key, MapConfig, MapStorage, SerializationError, Value},
};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Enough for a key, the largest field and the item header, rounded up to the flash word size.
const DATA_BUFFER_LEN: usize = 32;

/// Map key of a field: its offset in the byte layout.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    IntoBytes,
    FromBytes,
    Immutable,
    KnownLayout,
    Format,
)]
#[repr(C)]
pub struct FieldKey([u8; 2]);

impl FieldKey {
    pub fn new(offset: u32) -> Self {
        Self((offset as u16).to_le_bytes())
    }
}

impl Key for FieldKey {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        self.write_to_prefix(buffer)
            .map_err(|_| SerializationError::BufferTooSmall)?;
        Ok(size_of::<Self>())
    }

    fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
        let (key, _) =
            Self::read_from_prefix(buffer).map_err(|_| SerializationError::BufferTooSmall)?;
        Ok((key, size_of::<Self>()))
    }
}

/// Raw bytes of one field.
pub struct FieldBytes<'a>(&'a [u8]);

impl<'a> Value<'a> for FieldBytes<'a> {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        buffer
            .get_mut(..self.0.len())
            .ok_or(SerializationError::BufferTooSmall)?
            .copy_from_slice(self.0);
        Ok(self.0.len())
    }

    fn deserialize_from(buffer: &'a [u8]) -> Result<(Self, usize), SerializationError>
    where
        Self: Sized,
    {
        Ok((Self(buffer), buffer.len()))
    }
}

/// EEPROM style byte storage on top of a flash partition.
///
/// Every field of the layout is its own map item, keyed by offset, so a write replaces the
/// field atomically and a power cut leaves either the old or the new value. Reads and writes
/// have to address whole fields, the way `ConfigStore` does. Fields that were never written
/// read as zeros.
pub struct FlashEeprom<F: NorFlash> {
    map: MapStorage<FieldKey, F, NoCache>,
}

impl<F: NorFlash> FlashEeprom<F> {
    /// Uses all of `flash`.
    pub fn new(flash: F) -> Self {
        let map_config = MapConfig::new(0..flash.capacity() as u32);
        Self {
            map: MapStorage::new(flash, map_config, NoCache::new()),
        }
    }
}

impl<F: NorFlash> ByteStore for FlashEeprom<F> {
    type Error = sequential_storage::Error<F::Error>;

    async fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let mut data_buffer = [0; DATA_BUFFER_LEN];
        let stored = self
            .map
            .fetch_item::<FieldBytes>(&mut data_buffer, &FieldKey::new(offset))
            .await?;
        bytes.fill(0);
        if let Some(FieldBytes(stored)) = stored {
            let len = stored.len().min(bytes.len());
            bytes[..len].copy_from_slice(&stored[..len]);
        }
        Ok(())
    }

    async fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut data_buffer = [0; DATA_BUFFER_LEN];
        self.map
            .store_item(&mut data_buffer, &FieldKey::new(offset), &FieldBytes(bytes))
            .await
    }

    fn capacity(&self) -> usize {
        STORE_SIZE
    }
}
