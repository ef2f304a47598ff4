use std::marker::PhantomData;

/// Rounds `value` up to a multiple of `alignment`.
#[inline]
#[must_use]
pub fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

/// An array of `T` in one uniform buffer, each element at an aligned stride
/// and bound through a dynamic offset.
///
/// The buffer grows by doubling; the bind group is rebuilt with it.
pub struct DynamicUniforms<T: bytemuck::Pod> {
    label: &'static str,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: u32,
    stride: u32,
    staging: Vec<u8>,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> DynamicUniforms<T> {
    /// Layout entry for binding 0 of a group holding only this buffer.
    #[must_use]
    pub fn layout_entry(visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
            },
            count: None,
        }
    }

    #[must_use]
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &'static str) -> Self {
        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let stride = align_to(std::mem::size_of::<T>() as u32, min_alignment);
        let buffer = Self::create_buffer(device, label, stride, 1);
        let bind_group = Self::create_bind_group(device, layout, label, &buffer);

        Self {
            label,
            buffer,
            bind_group,
            capacity: 1,
            stride,
            staging: Vec::new(),
            _marker: PhantomData,
        }
    }

    fn create_buffer(
        device: &wgpu::Device,
        label: &'static str,
        stride: u32,
        capacity: u32,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: u64::from(stride) * u64::from(capacity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &'static str,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
                }),
            }],
        })
    }

    fn ensure_capacity(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        required: u32,
    ) {
        if required <= self.capacity {
            return;
        }

        let mut capacity = self.capacity.max(1);
        while capacity < required {
            capacity = capacity.saturating_mul(2);
        }

        self.buffer = Self::create_buffer(device, self.label, self.stride, capacity);
        self.bind_group = Self::create_bind_group(device, layout, self.label, &self.buffer);
        self.capacity = capacity;
    }

    /// Uploads `items`; element `i` is then bound with [`offset(i)`](Self::offset).
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        items: &[T],
    ) {
        if items.is_empty() {
            return;
        }
        self.ensure_capacity(device, layout, items.len() as u32);

        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(stride * items.len(), 0);
        for (i, item) in items.iter().enumerate() {
            let bytes = bytemuck::bytes_of(item);
            self.staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    #[inline]
    #[must_use]
    pub fn offset(&self, index: usize) -> u32 {
        index as u32 * self.stride
    }

    #[inline]
    #[must_use]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
